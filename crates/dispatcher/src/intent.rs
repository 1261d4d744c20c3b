// SPDX-License-Identifier: MIT

//! The closed intent taxonomy. The NL Dispatcher never yields
//! an intent outside this set — there is no "dynamic handler generation"
//! escape hatch.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MakeExecutable,
    CreateSymlink,
    CreateFile,
    EditFile,
    Build,
    InstallDependencies,
    StartServers,
    StopServers,
    SystemStatus,
    Cleanup,
    Deploy,
    Configure,
    Help,
    Unknown,
}

impl Intent {
    /// All intents other than `unknown`, in table-declaration order —
    /// iterated once per classification pass.
    pub const ALL: [Intent; 13] = [
        Intent::MakeExecutable,
        Intent::CreateSymlink,
        Intent::CreateFile,
        Intent::EditFile,
        Intent::Build,
        Intent::InstallDependencies,
        Intent::StartServers,
        Intent::StopServers,
        Intent::SystemStatus,
        Intent::Cleanup,
        Intent::Deploy,
        Intent::Configure,
        Intent::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MakeExecutable => "make_executable",
            Intent::CreateSymlink => "create_symlink",
            Intent::CreateFile => "create_file",
            Intent::EditFile => "edit_file",
            Intent::Build => "build",
            Intent::InstallDependencies => "install_dependencies",
            Intent::StartServers => "start_servers",
            Intent::StopServers => "stop_servers",
            Intent::SystemStatus => "system_status",
            Intent::Cleanup => "cleanup",
            Intent::Deploy => "deploy",
            Intent::Configure => "configure",
            Intent::Help => "help",
            Intent::Unknown => "unknown",
        }
    }

    /// Intents that are safe to resolve and dispatch synchronously rather than enqueued to the Supervisor's command channel.
    pub fn is_synchronous(&self) -> bool {
        matches!(self, Intent::SystemStatus | Intent::Help)
    }

    /// `dissolution`-class operations mutate the outside world (deploys,
    /// destructive cleanup) and require an explicit `--confirm` token in
    /// the utterance.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Intent::Deploy | Intent::Cleanup)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
