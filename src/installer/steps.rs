//! Fixed installation step sequence and log line classification

/// Step labels shown to the operator. The last one denotes completion.
pub const STEPS: [&str; 9] = [
    "Preparing installation",
    "Partitioning disk",
    "Running before-install",
    "Installing Active",
    "Configuring bootloader",
    "Creating Recovery",
    "Creating Passive",
    "Running after-install",
    "Installation complete!",
];

/// Index of the completion step
pub const COMPLETE_STEP: usize = STEPS.len() - 1;

/// Installer log fragments and the step they announce, checked in order
const MARKERS: [(&str, usize); 8] = [
    ("Partitioning", 1),
    ("Running stage: before-install", 2),
    ("Creating file system image", 3),
    ("Installing GRUB", 4),
    (
        "Copying /run/cos/state/cOS/active.img source to /run/cos/recovery/cOS/recovery.img",
        5,
    ),
    (
        "Copying /run/cos/state/cOS/active.img source to /run/cos/state/cOS/passive.img",
        6,
    ),
    ("Running stage: after-install", 7),
    ("Installation complete", COMPLETE_STEP),
];

/// Step announced by `line`, if any. The first matching marker wins.
pub fn classify(line: &str) -> Option<usize> {
    MARKERS
        .iter()
        .find(|(marker, _)| line.contains(marker))
        .map(|&(_, step)| step)
}

/// Label of step `index`, clamped to the sequence
pub fn label(index: usize) -> &'static str {
    STEPS[index.min(COMPLETE_STEP)]
}

/// Completion percentage for cursor `index`
pub fn percent(index: usize) -> u16 {
    (index.min(COMPLETE_STEP) * 100 / COMPLETE_STEP) as u16
}
