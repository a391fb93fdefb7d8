//! Replays a scripted key sequence through the engine and prints what the
//! host ends up seeing.
//!
//! Usage: `replay <table.kct> [script]`, where the script is a
//! whitespace-separated list such as `+A +D -D -A` (`+` press, `-` release).

use keycancel_core::keycode::parse_keycode;
use keycancel_core::{
    parser, ControlCode, Engine, HostEvent, HostState, KeyCode, KeyEdge, KeyEvent, MemoryStore,
    ModeFlags,
};

fn parse_step(raw: &str) -> anyhow::Result<(KeyCode, KeyEdge)> {
    let (edge, name) = if let Some(name) = raw.strip_prefix('+') {
        (KeyEdge::Down, name)
    } else if let Some(name) = raw.strip_prefix('-') {
        (KeyEdge::Up, name)
    } else {
        anyhow::bail!("step `{}` must start with + or -", raw);
    };
    let key = ControlCode::ALL
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
        .map(|c| c.keycode())
        .or_else(|| parse_keycode(name))
        .ok_or_else(|| anyhow::anyhow!("unknown key `{}`", name))?;
    Ok((key, edge))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let table_path = args
        .next()
        .unwrap_or_else(|| "tables/wasd-socd.kct".to_string());
    let script = args
        .next()
        .unwrap_or_else(|| "+A +D -D -A +W +S +KC_CANCEL_TOGG -S +S -S -W".to_string());

    let table = parser::load_table(&table_path)?;
    println!("Table: {} pairs", table.len());

    let mut engine = Engine::new(table, MemoryStore::with_flags(ModeFlags::new(true, true)));
    let mut host = HostState::new();

    for raw in script.split_whitespace() {
        let (key, edge) = parse_step(raw)?;
        let event = match edge {
            KeyEdge::Down => KeyEvent::down(),
            KeyEdge::Up => KeyEvent::up(),
        };

        let mut out: Vec<HostEvent> = Vec::new();
        let action = engine.process_key(key, event, &mut out);
        host.apply(&out);
        host.forward(key, edge, action);

        let held: Vec<String> = host.held().map(|k| k.to_string()).collect();
        println!(
            "{:>20}  {:?}  corrections={:?}  host=[{}]",
            raw,
            action,
            out,
            held.join(", ")
        );
    }

    Ok(())
}
