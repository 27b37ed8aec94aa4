use std::fmt::Write as _;

use cloudfront_step::StepPresentation;

const LOADING: &str = "(loading)";

pub fn render_text(presentation: &StepPresentation) -> String {
    let view = &presentation.view;
    let mut out = String::new();

    let _ = writeln!(out, "Distributions");
    if view.distributions_loading() {
        let _ = writeln!(out, "  {LOADING}");
    } else if view.distribution_options.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for option in &view.distribution_options {
        let marker = match &view.selection.distribution {
            Some(selected) if selected.value == option.value => '*',
            _ => ' ',
        };
        let _ = writeln!(out, " {marker} {}", option.label);
    }
    if let Some(message) = presentation.errors.distribution {
        let _ = writeln!(out, "  ! {}", message.text);
    }

    let _ = writeln!(out, "Behaviors");
    if view.behaviors_loading() {
        let _ = writeln!(out, "  {LOADING}");
    } else if view.selection.distribution.is_none() {
        let _ = writeln!(out, "  (choose a distribution first)");
    } else if view.behavior_options.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for option in &view.behavior_options {
        let marker = if view.selection.behaviors.contains(&option.value) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, " {marker} {}", option.label);
    }
    if let Some(message) = presentation.errors.behaviors {
        let _ = writeln!(out, "  ! {}", message.text);
    }

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "Note: {notice}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
