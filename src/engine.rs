use itertools::Itertools;

use crate::demo::DemoState;

pub fn update(state: &mut DemoState) -> anyhow::Result<()> {
    state.update();

    for fact in state.session.poll() {
        state.controller.observe(fact);
    }

    if let Err(err) = state.controller.pump(&mut state.subscription) {
        log::warn!("Frame {}: {}", state.frame, err);
    }

    let draw_list = state.controller.draw_list();
    log::info!(
        "Frame {:>2} | scalar {:.2} | {} nodes: {}",
        state.frame,
        state.controller.scalar(),
        draw_list.len(),
        draw_list
            .iter()
            .map(|item| {
                let p = item.world.translation();
                format!("{}@({:.2}, {:.2}, {:.2})", item.name, p.x, p.y, p.z)
            })
            .join(", ")
    );

    Ok(())
}
