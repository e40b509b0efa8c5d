use std::process::ExitCode;
use vk_bootstrap::{AppConfig, TutorialStage};

fn main() -> ExitCode {
    vk_bootstrap::launch(AppConfig::new(TutorialStage::BaseCode))
}
