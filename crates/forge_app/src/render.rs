use forge_core::AppViewModel;

/// Status lines for the log: queue, playback timing, then one per slot.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(2 + view.children.len());
    lines.push(view.queue.to_string());
    lines.push(view.activation.to_string());
    for child in &view.children {
        let marker = if Some(child.index) == view.active_slot {
            " *"
        } else {
            ""
        };
        lines.push(format!(
            "Child {}: {} {} {:?}{}",
            child.index,
            child.prompt,
            child.status_label(),
            child.state,
            marker
        ));
    }
    lines
}
