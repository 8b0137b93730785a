//! Docker CLI lookup of a container's merged overlay directory

use std::path::PathBuf;
use std::process::Command;

use super::{ContainerPathResolver, ContainerResolution};
use crate::error::{BackupError, BackupResult};

/// Resolves a container root by shelling out to `docker`
#[derive(Debug, Clone)]
pub struct DockerResolver {
    container_name: String,
}

impl DockerResolver {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
        }
    }

    /// Id of the running container with our name
    fn container_id(&self) -> BackupResult<String> {
        let filter = format!("name={}", self.container_name);
        let stdout = run_docker(&["ps", "-q", "-f", &filter])?;

        first_line(&stdout).ok_or_else(|| {
            BackupError::Container(format!(
                "Container named {} not found.",
                self.container_name
            ))
        })
    }

    fn merged_dir(&self, container_id: &str) -> BackupResult<PathBuf> {
        let stdout = run_docker(&[
            "inspect",
            "--format",
            "{{.GraphDriver.Data.MergedDir}}",
            container_id,
        ])?;

        first_line(&stdout).map(PathBuf::from).ok_or_else(|| {
            BackupError::Container(format!(
                "Failed to get MergedDir path for container {}.",
                container_id
            ))
        })
    }
}

impl ContainerPathResolver for DockerResolver {
    fn resolve_root(&self) -> ContainerResolution {
        let lookup = self
            .container_id()
            .and_then(|id| self.merged_dir(&id));

        match lookup {
            Ok(root) => ContainerResolution::Found(root),
            Err(e) => ContainerResolution::NotFound(e.to_string()),
        }
    }
}

fn run_docker(args: &[&str]) -> BackupResult<String> {
    tracing::debug!(?args, "Running docker");

    let output = Command::new("docker")
        .args(args)
        .output()
        .map_err(|e| BackupError::Container(format!("Failed to run docker: {}", e)))?;

    if !output.status.success() {
        return Err(BackupError::Container(format!(
            "docker {} failed: {}",
            args.first().copied().unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// First non-empty line of a command's output
fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("3f2a1b\n9c8d7e\n"), Some("3f2a1b".to_string()));
        assert_eq!(first_line("\n  \n"), None);
        assert_eq!(
            first_line("/var/lib/docker/overlay2/abc/merged\n"),
            Some("/var/lib/docker/overlay2/abc/merged".to_string())
        );
    }
}
