pub mod intervals {
    use std::time::Duration;

    pub const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);
}

pub mod limits {

    pub const MAX_MESSAGE_CHARS: usize = 4000;

    pub const MAX_URL_CHARS: usize = 2048;

    pub const MAX_FILENAME_BYTES: usize = 255;

    pub const WS_OUTBOUND_BUFFER: usize = 32;
}
