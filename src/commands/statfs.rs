use crate::context::Context;

/// statfs: block size, data block, inode and descriptor usage.
pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    let st = context.fs().statfs()?;
    let used_blocks = st.data_blocks - st.free_data_blocks;
    let used_inodes = st.inodes - st.free_inodes;

    println!("Block size:   {} B", st.block_size);
    println!(
        "Data blocks:  total={}, used={}, free={}",
        st.data_blocks, used_blocks, st.free_data_blocks
    );
    println!(
        "Inodes:       total={}, used={}, free={}",
        st.inodes, used_inodes, st.free_inodes
    );
    println!("Descriptors:  total={}, open={}", st.descriptors, st.open_descriptors);
    println!("Capacity:     {} B free", st.free_data_blocks as u64 * st.block_size as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_image_uses_one_inode() {
        let mut ctx = Context::scratch();
        handle_argv(&[], &mut ctx).unwrap();
        let st = ctx.fs().statfs().unwrap();
        assert_eq!(st.inodes - st.free_inodes, 1);
        assert_eq!(st.free_data_blocks, st.data_blocks);
    }
}
