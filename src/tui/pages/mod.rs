//! Wizard pages, in registry order

pub mod confirm;
pub mod customization;
pub mod disk;
pub mod install;
pub mod options;
pub mod prompt;
pub mod ssh_keys;
pub mod summary;
pub mod user;

use crate::config::Settings;
use crate::disks::Disk;
use crate::plugin::PromptSource;
use crate::tui::page::Page;

pub use confirm::ConfirmPage;
pub use customization::CustomizationPage;
pub use disk::DiskPage;
pub use install::InstallPage;
pub use options::OptionsPage;
pub use prompt::PromptPage;
pub use ssh_keys::SshKeysPage;
pub use summary::SummaryPage;
pub use user::UserPage;

/// Static pages. `advance` follows this order.
pub fn build(disks: Vec<Disk>, source: Box<dyn PromptSource>, settings: &Settings) -> Vec<Box<dyn Page>> {
    vec![
        Box::new(DiskPage::new(disks)),
        Box::new(ConfirmPage::new()),
        Box::new(OptionsPage::new()),
        Box::new(CustomizationPage::new(source)),
        Box::new(UserPage::new()),
        Box::new(SshKeysPage::new()),
        Box::new(SummaryPage::new()),
        Box::new(InstallPage::new(
            settings.installer.clone(),
            settings.output.clone(),
            settings.poll_interval(),
        )),
    ]
}
