use analyzer_core::SubmissionViewModel;

/// One piece of console output. A frame is the full list for a view; the
/// console only emits commands that were not part of the previous frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    ShowSelection { file_name: String, file_size: usize },
    ShowProgress { label: &'static str },
    ShowError { message: String },
    ShowReport { markdown: String },
}

pub fn render(view: &SubmissionViewModel) -> Vec<ConsoleCommand> {
    let mut cmds = Vec::new();

    if let (Some(file_name), Some(file_size)) = (&view.file_name, view.file_size) {
        cmds.push(ConsoleCommand::ShowSelection {
            file_name: file_name.clone(),
            file_size,
        });
    }

    if view.is_submitting {
        cmds.push(ConsoleCommand::ShowProgress {
            label: view.submit_label,
        });
    }

    if let Some(message) = &view.error_message {
        cmds.push(ConsoleCommand::ShowError {
            message: message.clone(),
        });
    }

    if let Some(markdown) = &view.report {
        cmds.push(ConsoleCommand::ShowReport {
            markdown: markdown.clone(),
        });
    }

    cmds
}

pub fn format_with_commas(value: usize) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
