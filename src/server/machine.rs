//! Operating-system specific service control.

use std::path::Path;

/// OS-family capability for controlling the database service.
///
/// Implementations produce the service-control command lines for their OS
/// family; [`ServerHandle::stop`](super::ServerHandle::stop) and
/// [`ServerHandle::start`](super::ServerHandle::start) issue them through
/// the remote-command runner.
pub trait Machine {
    /// Default location of the server configuration file on this family.
    fn defaults_file(&self) -> &Path;

    /// Command that stops the database service.
    fn stop_command(&self) -> Vec<String>;

    /// Command that starts the database service.
    fn start_command(&self) -> Vec<String>;
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Service control for (Debian-flavored) Linux hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxMachine;

impl Machine for LinuxMachine {
    fn defaults_file(&self) -> &Path {
        Path::new("/etc/mysql/my.cnf")
    }

    fn stop_command(&self) -> Vec<String> {
        argv(&["/etc/init.d/mysql", "stop"])
    }

    fn start_command(&self) -> Vec<String> {
        argv(&["/etc/init.d/mysql", "start"])
    }
}

/// Service control for Solaris hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarisMachine;

impl Machine for SolarisMachine {
    fn defaults_file(&self) -> &Path {
        Path::new("/etc/mysql/my.cnf")
    }

    fn stop_command(&self) -> Vec<String> {
        argv(&["/etc/sbin/svcadm", "disable", "mysql"])
    }

    fn start_command(&self) -> Vec<String> {
        argv(&["/etc/sbin/svcadm", "enable", "mysql"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_uses_init_scripts() {
        let machine = LinuxMachine;
        assert_eq!(machine.stop_command(), ["/etc/init.d/mysql", "stop"]);
        assert_eq!(machine.start_command(), ["/etc/init.d/mysql", "start"]);
    }

    #[test]
    fn test_solaris_uses_svcadm() {
        let machine = SolarisMachine;
        assert_eq!(machine.stop_command(), ["/etc/sbin/svcadm", "disable", "mysql"]);
        assert_eq!(machine.start_command(), ["/etc/sbin/svcadm", "enable", "mysql"]);
    }
}
