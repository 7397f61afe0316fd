use crate::cell::{CellStyle, CellValue};

/// Severity classification of a status or reason string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Default,
    Ok,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn style(self) -> Option<CellStyle> {
        match self {
            StatusLevel::Default => None,
            StatusLevel::Ok => Some(CellStyle::Ok),
            StatusLevel::Warning => Some(CellStyle::Warning),
            StatusLevel::Error => Some(CellStyle::Error),
        }
    }
}

// Container event reason list
const ERROR_STATUSES: &[&str] = &[
    "Failed",
    "BackOff",
    "ExceededGracePeriod",
    // Pod event reason list
    "FailedKillPod",
    "FailedCreatePodContainer",
    "NetworkNotReady",
    // Image event reason list
    "InspectFailed",
    "ErrImageNeverPull",
    // kubelet event reason list
    "NodeNotSchedulable",
    "KubeletSetupFailed",
    "FailedAttachVolume",
    "FailedMount",
    "VolumeResizeFailed",
    "FileSystemResizeFailed",
    "FailedMapVolume",
    "ContainerGCFailed",
    "ImageGCFailed",
    "FailedNodeAllocatableEnforcement",
    "FailedCreatePodSandBox",
    "FailedPodSandBoxStatus",
    "FailedMountOnFilesystemMismatch",
    // Image manager event reason list
    "InvalidDiskCapacity",
    "FreeDiskSpaceFailed",
    // Probe event reason list
    "Unhealthy",
    // Pod worker event reason list
    "FailedSync",
    // Config event reason list
    "FailedValidation",
    // Lifecycle hooks
    "FailedPostStartHook",
    "FailedPreStopHook",
    // Node status list
    "NotReady",
    "NetworkUnavailable",
    // some other status
    "CreateContainerConfigError",
    "ContainerStatusUnknown",
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "Evicted",
    "FailedScheduling",
    "Error",
    "ErrImagePull",
];

const WARNING_STATUSES: &[&str] = &[
    // Container event reason list
    "Killing",
    "Preempting",
    // kubelet event reason list
    "NodeNotReady",
    "NodeSchedulable",
    "Starting",
    "AlreadyMountedVolume",
    "SuccessfulAttachVolume",
    "SuccessfulMountVolume",
    "NodeAllocatableEnforced",
    // Probe event reason list
    "ProbeWarning",
    // Node event reason list
    "SchedulingDisabled",
    "DiskPressure",
    "MemoryPressure",
    "PIDPressure",
    // some other status
    "Pending",
    "ContainerCreating",
    "PodInitializing",
    "Terminating",
    "Warning",
    // PV reclaim policy
    "Delete",
];

const OK_STATUSES: &[&str] = &[
    "Running",
    "Completed",
    "Pulled",
    "Created",
    "Rebooted",
    "NodeReady",
    "Started",
    "Normal",
    "VolumeResizeSuccessful",
    "FileSystemResizeSuccessful",
    "Ready",
    // PV reclaim policy
    "Retain",
];

/// Classify a status or event-reason string against the fixed taxonomy.
/// Unrecognized strings stay unstyled.
pub fn classify(status: &str) -> StatusLevel {
    if ERROR_STATUSES.contains(&status) {
        return StatusLevel::Error;
    }
    if WARNING_STATUSES.contains(&status) {
        return StatusLevel::Warning;
    }
    if OK_STATUSES.contains(&status) {
        return StatusLevel::Ok;
    }
    StatusLevel::Default
}

/// Build the cell for a status column. Comma lists ("Init:0/1,PodInitializing")
/// classify each element independently and join them back with commas.
pub fn status_cell(status: &str) -> CellValue {
    if !status.contains(',') {
        return styled_status(status);
    }
    CellValue::Joined {
        delimiter: ",".to_string(),
        values: status.split(',').map(styled_status).collect(),
    }
}

fn styled_status(status: &str) -> CellValue {
    let text = CellValue::text(status);
    match classify(status).style() {
        Some(style) => CellValue::styled(style, text),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_statuses() {
        assert_eq!(classify("CrashLoopBackOff"), StatusLevel::Error);
        assert_eq!(classify("ErrImagePull"), StatusLevel::Error);
        assert_eq!(classify("Evicted"), StatusLevel::Error);
        assert_eq!(classify("Pending"), StatusLevel::Warning);
        assert_eq!(classify("ContainerCreating"), StatusLevel::Warning);
        assert_eq!(classify("Terminating"), StatusLevel::Warning);
        assert_eq!(classify("Running"), StatusLevel::Ok);
        assert_eq!(classify("Completed"), StatusLevel::Ok);
        assert_eq!(classify("Ready"), StatusLevel::Ok);
    }

    #[test]
    fn unknown_statuses_are_default() {
        assert_eq!(classify("SomeUnknownReason"), StatusLevel::Default);
        assert_eq!(classify("SandboxChanged"), StatusLevel::Default);
        assert_eq!(classify("Pulling"), StatusLevel::Default);
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(classify("running"), StatusLevel::Default);
    }

    #[test]
    fn reclaim_policies_classify() {
        assert_eq!(classify("Retain"), StatusLevel::Ok);
        assert_eq!(classify("Delete"), StatusLevel::Warning);
    }

    #[test]
    fn comma_lists_split_into_joined_cells() {
        match status_cell("Running,Error") {
            CellValue::Joined { delimiter, values } => {
                assert_eq!(delimiter, ",");
                assert_eq!(values.len(), 2);
                assert_eq!(
                    values[0],
                    CellValue::styled(CellStyle::Ok, CellValue::text("Running"))
                );
                assert_eq!(
                    values[1],
                    CellValue::styled(CellStyle::Error, CellValue::text("Error"))
                );
            }
            other => panic!("expected joined cell, got {other:?}"),
        }
    }
}
