mod ask;
mod list;
mod synth;

pub use ask::cmd_ask;
pub use list::cmd_list_media;
pub use synth::cmd_synth;
