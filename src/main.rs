use vkboot::app::{AppConfig, AppError, Application};
use vkboot::loader::VulkanLoader;
use vkboot::window::WinitSystem;

use std::process::ExitCode;

fn run() -> Result<(), AppError> {
    let cfg = AppConfig::from_env();

    let loader = VulkanLoader::new(cfg.dynamic_load)?;
    let system = WinitSystem::new()?;

    let mut app = Application::new(cfg, loader, system);

    app.run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
