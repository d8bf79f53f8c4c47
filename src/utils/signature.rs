use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Generate the confirmation reference handed back for a withdrawal.
///
/// This is a local placeholder (`DEMO_<unix millis>_<base36>`), not a
/// network transaction id. Nothing is signed or broadcast.
pub fn confirmation_reference() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("DEMO_{}_{}", millis, suffix)
}
