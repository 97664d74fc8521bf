use std::sync::Once;

static INSTALL: Once = Once::new();

/// Keeps Ctrl-C from killing the shell while a foreground child or script
/// runs. The child still receives the signal.
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    let mut result = Ok(());
    INSTALL.call_once(|| {
        result = ctrlc::set_handler(|| {
            println!("\nUse 'quit()' to exit the shell");
        });
    });
    result
}
