//! Provenance banner written at the top of every generated file.

use std::io;

use crate::host::{HostConfiguration, ToolIdentity};
use crate::writer::ConfigWriter;

const RULE: &str =
    "------------------------------------------------------------------------------";
const OPEN_TAG: &str = "<auto-generated>";
const CLOSE_TAG: &str = "</auto-generated>";

/// Lines scanned by [`is_generated`] before giving up.
const BANNER_SCAN_LINES: usize = 32;

/// Write the banner, followed by one blank line.
///
/// `declaration_name` is the name under which the host is declared; the
/// banner shows how to switch its `AutoGenerate` toggle off.
pub fn write_provenance_header(
    writer: &mut ConfigWriter<'_>,
    declaration_name: &str,
    host: &HostConfiguration,
    tool: &ToolIdentity,
) -> io::Result<()> {
    writer.write_comment(RULE)?;
    writer.write_comment(OPEN_TAG)?;
    writer.write_comment("")?;
    writer.write_comment("    This code was generated.")?;
    writer.write_comment("")?;
    writer.write_comment("    - To turn off auto-generation set:")?;
    writer.write_comment("")?;
    writer.write_comment(&format!(
        "        [{declaration_name} (AutoGenerate = false)]"
    ))?;
    writer.write_comment("")?;
    writer.write_comment("    - To trigger manual generation invoke:")?;
    writer.write_comment("")?;
    writer.write_comment(&format!("        {}", tool.regeneration_command(host)))?;
    writer.write_comment("")?;
    writer.write_comment(CLOSE_TAG)?;
    writer.write_comment(RULE)?;
    writer.write_blank_line()
}

/// Whether `content` starts with a provenance banner.
pub fn is_generated(content: &str) -> bool {
    let mut opened = false;
    for line in content.lines().take(BANNER_SCAN_LINES) {
        if line.contains(OPEN_TAG) {
            opened = true;
        } else if opened && line.contains(CLOSE_TAG) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::CommentSyntax;

    fn banner(syntax: CommentSyntax) -> String {
        let host = HostConfiguration::new("GitHubActions", "ci.yml").with_postfix("staging");
        let mut buf = Vec::new();
        {
            let mut writer = ConfigWriter::new(&mut buf, syntax);
            write_provenance_header(&mut writer, "GitHubActions", &host, &ToolIdentity::default())
                .unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_banner_hash_syntax() {
        let expected = "\
# ------------------------------------------------------------------------------
# <auto-generated>
#
#     This code was generated.
#
#     - To turn off auto-generation set:
#
#         [GitHubActions (AutoGenerate = false)]
#
#     - To trigger manual generation invoke:
#
#         stagehand --generate-configuration GitHubActions_staging --host GitHubActions
#
# </auto-generated>
# ------------------------------------------------------------------------------

";
        assert_eq!(banner(CommentSyntax::Hash), expected);
    }

    #[test]
    fn test_banner_uses_target_comment_syntax() {
        let kotlin = banner(CommentSyntax::DoubleSlash);
        assert!(kotlin.lines().filter(|l| !l.is_empty()).all(|l| l.starts_with("//")));

        let xml = banner(CommentSyntax::Xml);
        assert!(xml
            .lines()
            .filter(|l| !l.is_empty())
            .all(|l| l.starts_with("<!--") && l.ends_with("-->")));
    }

    #[test]
    fn test_is_generated_recognises_banner() {
        let mut content = banner(CommentSyntax::Hash);
        content.push_str("name: ci\n");
        assert!(is_generated(&content));
        assert!(is_generated(&banner(CommentSyntax::Xml)));
    }

    #[test]
    fn test_is_generated_rejects_hand_written() {
        assert!(!is_generated("name: ci\non: push\n"));
        assert!(!is_generated("# <auto-generated>\nnot closed\n"));
        assert!(!is_generated(""));
    }
}
