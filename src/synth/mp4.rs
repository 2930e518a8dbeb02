use rand::Rng;

/// Seconds between 1904-01-01 (MP4 epoch) and 1970-01-01.
pub const MP4_EPOCH_OFFSET: u32 = 2_082_844_800;

const FTYP_SIZE: u32 = 32;
const MVHD_SIZE: u32 = 108;
const TKHD_SIZE: u32 = 92;
const TIMESCALE: u32 = 1000;

const UNITY_MATRIX: [u32; 9] = [
    0x0001_0000,
    0,
    0,
    0,
    0x0001_0000,
    0,
    0,
    0,
    0x4000_0000,
];

#[derive(Debug, Clone, Copy)]
pub struct Mp4Params {
    pub duration_secs: u32,
    pub width: u32,
    pub height: u32,
    pub payload_size: usize,
    /// Seconds since the MP4 epoch (1904).
    pub creation_time: u32,
}

impl Mp4Params {
    /// Converts a unix timestamp to the MP4 epoch, saturating on overflow.
    #[must_use]
    pub fn mp4_time(unix_secs: i64) -> u32 {
        u32::try_from(unix_secs.max(0))
            .unwrap_or(u32::MAX)
            .saturating_add(MP4_EPOCH_OFFSET)
    }
}

#[must_use]
pub fn build_mp4(params: &Mp4Params) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        (FTYP_SIZE + MVHD_SIZE + TKHD_SIZE) as usize + 8 + params.payload_size,
    );

    write_ftyp(&mut out);
    write_mvhd(&mut out, params);
    write_tkhd(&mut out, params);
    write_mdat(&mut out, params.payload_size);

    out
}

fn box_header(out: &mut Vec<u8>, size: u32, tag: &[u8; 4]) {
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(tag);
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_ftyp(out: &mut Vec<u8>) {
    box_header(out, FTYP_SIZE, b"ftyp");
    out.extend_from_slice(b"isom");
    put_u32(out, 0x200);
    for brand in [b"isom", b"iso2", b"avc1", b"mp41"] {
        out.extend_from_slice(brand);
    }
}

fn write_matrix(out: &mut Vec<u8>) {
    for value in UNITY_MATRIX {
        put_u32(out, value);
    }
}

fn write_mvhd(out: &mut Vec<u8>, params: &Mp4Params) {
    box_header(out, MVHD_SIZE, b"mvhd");
    put_u32(out, 0); // version + flags
    put_u32(out, params.creation_time);
    put_u32(out, params.creation_time);
    put_u32(out, TIMESCALE);
    put_u32(out, params.duration_secs.saturating_mul(TIMESCALE));
    put_u32(out, 0x0001_0000); // rate 1.0
    put_u16(out, 0x0100); // volume 1.0
    out.extend_from_slice(&[0; 10]);
    write_matrix(out);
    out.extend_from_slice(&[0; 24]); // pre_defined
    put_u32(out, 2); // next_track_ID
}

fn write_tkhd(out: &mut Vec<u8>, params: &Mp4Params) {
    box_header(out, TKHD_SIZE, b"tkhd");
    put_u32(out, 0x0000_0003); // enabled | in_movie
    put_u32(out, params.creation_time);
    put_u32(out, params.creation_time);
    put_u32(out, 1); // track_ID
    put_u32(out, 0);
    put_u32(out, params.duration_secs.saturating_mul(TIMESCALE));
    out.extend_from_slice(&[0; 8]);
    put_u16(out, 0); // layer
    put_u16(out, 0); // alternate_group
    put_u16(out, 0); // volume, video track
    put_u16(out, 0);
    write_matrix(out);
    put_u32(out, params.width.saturating_mul(0x1_0000));
    put_u32(out, params.height.saturating_mul(0x1_0000));
}

fn write_mdat(out: &mut Vec<u8>, payload_size: usize) {
    let size = u32::try_from(payload_size + 8).unwrap_or(u32::MAX);
    box_header(out, size, b"mdat");
    out.extend_from_slice(&mdat_payload(payload_size));
}

/// Fills the media data with NAL-like start codes every 100 bytes, a random
/// byte every 50, and a sine ramp everywhere else.
#[must_use]
pub fn mdat_payload(size: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut payload = vec![0u8; size];

    let mut i = 0;
    while i < size {
        if i % 100 == 0 {
            let nal_type = if (i / 100) % 3 == 0 { 0x67 } else { 0x41 };
            let marker = [0x00, 0x00, 0x01, nal_type];
            let end = (i + marker.len()).min(size);
            payload[i..end].copy_from_slice(&marker[..end - i]);
            i = end;
            continue;
        }

        payload[i] = if i % 50 == 0 {
            rng.random::<u8>()
        } else {
            sine_byte(i)
        };
        i += 1;
    }

    payload
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sine_byte(i: usize) -> u8 {
    let value = 127.0f64.mul_add((0.01 * i as f64).sin(), 128.0).round();
    value.clamp(0.0, 255.0) as u8
}
