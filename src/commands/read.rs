use crate::commands::{expect_args, parse_count, parse_fd};
use crate::context::Context;
use crate::fs::consts::MAX_FILE_SIZE;

/// read <fd> <count>
/// Prints up to `count` bytes from the descriptor's offset (lossy UTF-8).
pub fn handle_argv(argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    expect_args(argv, 2, 2, "read <fd> <count>")?;
    let fd = parse_fd(argv[0])?;
    let mut buf = vec![0u8; parse_count(argv[1])?.min(MAX_FILE_SIZE) as usize];
    let n = context.fs_mut().fs_read(fd, &mut buf)?;
    println!("{}", String::from_utf8_lossy(&buf[..n]));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OpenFlag;

    #[test]
    fn advances_offset() {
        let mut ctx = Context::scratch();
        let fd = ctx.fs_mut().fs_open("/f", OpenFlag::read_write() | OpenFlag::Create).unwrap();
        ctx.fs_mut().fs_write(fd, b"abcdef").unwrap();
        ctx.fs_mut().fs_seek(fd, 0).unwrap();
        let arg = fd.to_string();
        handle_argv(&[&arg, "4"], &mut ctx).unwrap();
        let mut rest = [0u8; 8];
        assert_eq!(ctx.fs_mut().fs_read(fd, &mut rest).unwrap(), 2);
        assert_eq!(&rest[..2], b"ef");
    }
}
