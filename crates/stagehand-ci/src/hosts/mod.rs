//! Concrete CI hosts.

pub mod github;
pub mod gitlab;
pub mod teamcity;

pub use github::GitHubActions;
pub use gitlab::GitLab;
pub use teamcity::TeamCity;

/// `<build_command> <target>`, with the target name shell-quoted when needed.
pub(crate) fn build_invocation(build_command: &str, target: &str) -> String {
    format!("{build_command} {}", shell_quote(target))
}

/// Single-quote `arg` for a POSIX shell unless it only holds safe characters.
pub(crate) fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./+=@%,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}


#[cfg(test)]
pub(crate) mod test_support {
    use stagehand_core::ExecutionPlan;

    use crate::generator::ConfigurationGenerator;
    use crate::writer::ConfigWriter;

    /// Serialize a host's entity for `plan`, without the provenance header.
    pub fn render<S, G: ConfigurationGenerator<S>>(host: &G, plan: &ExecutionPlan<'_, S>) -> String {
        let entity = host.build_configuration(plan).unwrap();
        let mut buf = Vec::new();
        {
            let mut writer =
                ConfigWriter::new(&mut buf, host.comment_syntax()).with_indent_width(host.indent_width());
            entity.write(&mut writer).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }
}
