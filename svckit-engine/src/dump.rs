//! Command dump exporter — a descriptor rendered as the svckit command
//! sequence that would recreate it. Purely textual; nothing is executed and
//! no native call is made.

use svckit_core::types::ServiceDescriptor;

use crate::params::keys;

/// Render `descriptor` as management-command lines, optionally under a new
/// service name. The install line always comes first; one `set` line follows
/// per non-empty optional field.
pub fn dump(descriptor: &ServiceDescriptor, new_name: Option<&str>) -> String {
    let name = new_name.unwrap_or(&descriptor.name.0);

    let mut install = format!(
        "svckit install {name} \"{}\"",
        descriptor.executable_path
    );
    if !descriptor.arguments.is_empty() {
        install.push(' ');
        install.push_str(&descriptor.arguments);
    }

    let mut lines = vec![install];
    for (param, value) in [
        (keys::SERVICE_DESCRIPTION, &descriptor.description),
        (keys::WORKING_DIRECTORY, &descriptor.working_directory),
        (keys::STDOUT_PATH, &descriptor.stdout_path),
        (keys::STDERR_PATH, &descriptor.stderr_path),
    ] {
        if !value.is_empty() {
            lines.push(format!("svckit set {name} {param} \"{value}\""));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_descriptor_is_a_single_install_line() {
        let desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        assert_eq!(dump(&desc, None), "svckit install svcA \"C:\\app\\a.exe\"");
    }

    #[test]
    fn optional_fields_add_set_lines_in_order() {
        let mut desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        desc.arguments = "--flag".to_string();
        desc.description = "demo service".to_string();
        desc.working_directory = r"C:\app".to_string();
        desc.stderr_path = r"C:\logs\err.log".to_string();

        let text = dump(&desc, None);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "svckit install svcA \"C:\\app\\a.exe\" --flag",
                "svckit set svcA ServiceDescription \"demo service\"",
                "svckit set svcA WorkingDirectory \"C:\\app\"",
                "svckit set svcA StderrPath \"C:\\logs\\err.log\"",
            ]
        );
    }

    #[test]
    fn new_name_replaces_the_original_everywhere() {
        let mut desc = ServiceDescriptor::new("svcA", r"C:\app\a.exe");
        desc.working_directory = r"C:\app".to_string();
        let text = dump(&desc, Some("svcB"));
        assert!(text.contains("install svcB"));
        assert!(text.contains("set svcB WorkingDirectory"));
        assert!(!text.contains("svcA"));
    }
}
