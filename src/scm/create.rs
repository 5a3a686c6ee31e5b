//! Service creation parameters.

/// Everything needed to (re)create the tunnel service for one start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    /// Human-readable service description.
    pub description: String,
    /// Full executable path plus arguments run when the service starts.
    pub command_line: String,
    /// Services that must be running first.
    pub dependencies: Vec<String>,
    /// Whether the one automatic delete-and-recreate cycle is still allowed.
    pub first_time: bool,
}

impl CreateSpec {
    /// Creation parameters with no dependencies that permits the recreate cycle.
    pub fn new(description: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command_line: command_line.into(),
            dependencies: Vec::new(),
            first_time: true,
        }
    }

    /// Creation parameters for a WireGuard tunnel service.
    pub fn for_tunnel(
        service_name: &str,
        command_line: impl Into<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self::new(format!("{} WireGuard tunnel", service_name), command_line)
            .with_dependencies(dependencies)
    }

    /// Set the dependency list.
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set whether the recreate cycle is allowed.
    pub fn with_first_time(mut self, first_time: bool) -> Self {
        self.first_time = first_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tunnel() {
        let spec = CreateSpec::for_tunnel(
            "wgtun",
            r#"C:\x\wireguard_svc.exe -service -config-file="C:\temp\wg_conf1.conf""#,
            vec!["Nsi".to_string(), "TcpIp".to_string()],
        );
        assert_eq!(spec.description, "wgtun WireGuard tunnel");
        assert_eq!(spec.dependencies, vec!["Nsi", "TcpIp"]);
        assert!(spec.first_time);
    }

    #[test]
    fn test_with_first_time() {
        let spec = CreateSpec::new("d", "c").with_first_time(false);
        assert!(!spec.first_time);
        assert!(spec.dependencies.is_empty());
    }
}
