use crate::context::Context;

pub fn handle_argv(_argv: &[&str], context: &mut Context) -> anyhow::Result<()> {
    context.running = false;
    Ok(())
}
