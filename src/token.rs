use rand::Rng;

/// Characters a URL token may contain: lowercase, uppercase, digits.
pub const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of tokens issued for newly registered groups.
pub const TOKEN_LENGTH: usize = 10;

/// Generate a random alphanumeric token of exactly `length` characters.
///
/// Tokens are URL suffixes, not secrets. `thread_rng` happens to be a CSPRNG
/// in rand 0.8, but nothing here relies on that.
pub fn generate_token(length: usize) -> String {
    generate_token_with(&mut rand::thread_rng(), length)
}

/// Same as [`generate_token`] with a caller-supplied random source.
pub fn generate_token_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
