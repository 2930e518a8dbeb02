use rand::Rng;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Luminance DC code lengths and symbols (ITU T.81 table K.3).
const DC_LUMA_BITS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const DC_LUMA_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// Builds a JPEG marker skeleton around a raw RGB gradient.
///
/// The scan data is not entropy coded, so decoders will reject it; the marker
/// sequence and header fields are well formed.
#[must_use]
pub fn build_jpeg(width: u16, height: u16) -> Vec<u8> {
    let pixels = usize::from(width) * usize::from(height) * 3;
    let mut out = Vec::with_capacity(256 + pixels);

    out.extend_from_slice(&SOI);
    write_app0(&mut out);
    write_dqt(&mut out);
    write_sof0(&mut out, width, height);
    write_dht(&mut out);
    write_sos(&mut out);
    write_gradient(&mut out, width, height);
    out.extend_from_slice(&EOI);

    out
}

fn segment(out: &mut Vec<u8>, marker: u8, body: &[u8]) {
    out.extend_from_slice(&[0xFF, marker]);
    let len = u16::try_from(body.len() + 2).unwrap_or(u16::MAX);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
}

fn write_app0(out: &mut Vec<u8>) {
    let body = [
        b'J', b'F', b'I', b'F', 0x00, // identifier
        0x01, 0x01, // version 1.1
        0x00, // no density units
        0x00, 0x01, 0x00, 0x01, // 1:1 density
        0x00, 0x00, // no thumbnail
    ];
    segment(out, 0xE0, &body);
}

fn write_dqt(out: &mut Vec<u8>) {
    let mut rng = rand::rng();
    let mut body = Vec::with_capacity(65);
    body.push(0x00); // 8-bit precision, table 0
    body.extend((0..64).map(|_| rng.random_range(1..=99u8)));
    segment(out, 0xDB, &body);
}

fn write_sof0(out: &mut Vec<u8>, width: u16, height: u16) {
    let mut body = Vec::with_capacity(15);
    body.push(8);
    body.extend_from_slice(&height.to_be_bytes());
    body.extend_from_slice(&width.to_be_bytes());
    body.push(3);
    // id, sampling factors, quantization table
    body.extend_from_slice(&[1, 0x22, 0]);
    body.extend_from_slice(&[2, 0x11, 0]);
    body.extend_from_slice(&[3, 0x11, 0]);
    segment(out, 0xC0, &body);
}

fn write_dht(out: &mut Vec<u8>) {
    let mut body = Vec::with_capacity(29);
    body.push(0x00); // DC class, table 0
    body.extend_from_slice(&DC_LUMA_BITS);
    body.extend_from_slice(&DC_LUMA_VALUES);
    segment(out, 0xC4, &body);
}

fn write_sos(out: &mut Vec<u8>) {
    let body = [
        3, // components
        1, 0x00, 2, 0x00, 3, 0x00, // component id, DC/AC tables
        0,  // Ss
        63, // Se
        0,  // Ah/Al
    ];
    segment(out, 0xDA, &body);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write_gradient(out: &mut Vec<u8>, width: u16, height: u16) {
    let w = f64::from(width.max(1));
    let h = f64::from(height.max(1));
    let wh = f64::from(u32::from(width) + u32::from(height)).max(1.0);

    for y in 0..height {
        for x in 0..width {
            let (fx, fy) = (f64::from(x), f64::from(y));
            out.push((fx / w * 255.0) as u8);
            out.push((fy / h * 255.0) as u8);
            out.push(((fx + fy) / wh * 255.0) as u8);
        }
    }
}
