// Terminal front end for the lucky draw: renders draw snapshots and turns
// key presses into draw commands.

pub mod tui;
