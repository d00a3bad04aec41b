// # Payload Decryptor
//
// Turns the base64 ciphertext delivered by the rating endpoint into a parsed
// JSON document.
//
// ## Wire Scheme
//
// AES-256-CBC with a fixed key and IV and **no authentication**. The sender
// zero-pads the plaintext up to the block boundary instead of using a
// standard padding scheme, so decryption strips all trailing 0x00 bytes
// before UTF-8/JSON decoding.
//
// A legitimate plaintext that itself ends in 0x00 bytes is truncated by this
// recovery. That loss is part of the wire contract and is replicated here
// exactly; see `trailing_zero_plaintext_is_truncated`.

use aes::Aes256;
use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::{CIPHER_BLOCK_SIZE, CipherConfig};
use crate::error::{Error, Result};

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Decryptor for the encrypted payload envelope
///
/// Holds the fixed key/IV pair from configuration. Key and IV lengths are
/// validated once at construction; the cipher instances themselves are
/// created per call (CBC decryptors are single-use).
#[derive(Clone)]
pub struct Decryptor {
    key: [u8; 32],
    iv: [u8; CIPHER_BLOCK_SIZE],
}

// Key material never appears in debug output
impl std::fmt::Debug for Decryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decryptor")
            .field("key", &"<REDACTED>")
            .field("iv", &"<REDACTED>")
            .finish()
    }
}

impl Decryptor {
    /// Create a decryptor from validated cipher configuration
    pub fn new(config: &CipherConfig) -> Result<Self> {
        config.validate()?;

        let key: [u8; 32] = config
            .key
            .as_slice()
            .try_into()
            .map_err(|_| Error::config("AES key must be 32 bytes"))?;
        let iv: [u8; CIPHER_BLOCK_SIZE] = config
            .iv
            .as_slice()
            .try_into()
            .map_err(|_| Error::config("AES IV must be 16 bytes"))?;

        Ok(Self { key, iv })
    }

    /// Decrypt a base64 ciphertext to the zero-stripped plaintext string
    pub fn decrypt_text(&self, ciphertext_b64: &str) -> Result<String> {
        let raw = BASE64
            .decode(ciphertext_b64.trim())
            .map_err(|e| Error::decryption(format!("malformed base64: {}", e)))?;

        if raw.is_empty() {
            return Err(Error::decryption("empty ciphertext"));
        }
        if raw.len() % CIPHER_BLOCK_SIZE != 0 {
            return Err(Error::decryption(format!(
                "ciphertext length {} is not a multiple of the {}-byte block size",
                raw.len(),
                CIPHER_BLOCK_SIZE
            )));
        }

        let mut buf = raw;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|e| Error::decryption(format!("block decryption failed: {}", e)))?;

        // Recover the zero-padded plaintext; trailing 0x00 bytes are gone
        // even when the sender meant them.
        let end = plaintext
            .iter()
            .rposition(|&b| b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);

        String::from_utf8(plaintext[..end].to_vec())
            .map_err(|e| Error::decryption(format!("plaintext is not valid UTF-8: {}", e)))
    }

    /// Decrypt a base64 ciphertext to a parsed JSON document
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<serde_json::Value> {
        let text = self.decrypt_text(ciphertext_b64)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::decryption(format!("plaintext is not valid JSON: {}", e)))
    }

    /// Encrypt a plaintext the way the upstream sender does
    ///
    /// Zero-pads to the block boundary and returns base64. Exists so tests
    /// and fixtures can build wire-accurate ciphertexts; round-trips with
    /// [`Decryptor::decrypt_text`] for plaintexts with no trailing zero
    /// bytes.
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let mut buf = plaintext.to_vec();
        let pad = (CIPHER_BLOCK_SIZE - buf.len() % CIPHER_BLOCK_SIZE) % CIPHER_BLOCK_SIZE;
        buf.resize(buf.len() + pad, 0u8);

        let len = buf.len();
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .expect("buffer is block aligned by construction");

        BASE64.encode(ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_decryptor() -> Decryptor {
        Decryptor::new(&CipherConfig {
            key: b"6875616E6779696E6875616E6779696E".to_vec(),
            iv: b"sskjKingFree5138".to_vec(),
        })
        .unwrap()
    }

    #[test]
    fn round_trip_block_aligned_plaintext() {
        let decryptor = test_decryptor();
        // 32 bytes, no trailing zeros
        let plaintext = br#"{"data":{"cioName":"Example"}} X"#;
        assert_eq!(plaintext.len() % CIPHER_BLOCK_SIZE, 0);

        let ciphertext = decryptor.encrypt(plaintext);
        let recovered = decryptor.decrypt_text(&ciphertext).unwrap();
        assert_eq!(recovered.as_bytes(), plaintext);
    }

    #[test]
    fn round_trip_unaligned_plaintext_via_zero_padding() {
        let decryptor = test_decryptor();
        let plaintext = br#"{"data":{"lhxwArray":[]}}"#;

        let ciphertext = decryptor.encrypt(plaintext);
        let recovered = decryptor.decrypt_text(&ciphertext).unwrap();
        assert_eq!(recovered.as_bytes(), plaintext.as_slice());
    }

    #[test]
    fn decrypt_parses_json() {
        let decryptor = test_decryptor();
        let ciphertext = decryptor.encrypt(br#"{"data":{"cioName":"Example Group"}}"#);

        let value = decryptor.decrypt(&ciphertext).unwrap();
        assert_eq!(value["data"]["cioName"], "Example Group");
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let decryptor = test_decryptor();
        let err = decryptor.decrypt_text("!!not base64!!").unwrap_err();
        assert!(matches!(err, Error::Decryption(_)));
    }

    #[test]
    fn unaligned_ciphertext_is_rejected() {
        let decryptor = test_decryptor();
        // 8 raw bytes: valid base64, not a multiple of the block size
        let err = decryptor.decrypt_text(&BASE64.encode([1u8; 8])).unwrap_err();
        assert!(matches!(err, Error::Decryption(_)));
    }

    #[test]
    fn garbage_plaintext_is_rejected_as_json() {
        let decryptor = test_decryptor();
        let ciphertext = decryptor.encrypt(b"not json at all");
        let err = decryptor.decrypt(&ciphertext).unwrap_err();
        assert!(matches!(err, Error::Decryption(_)));
    }

    #[test]
    fn trailing_zero_plaintext_is_truncated() {
        // The zero-strip recovery cannot distinguish padding from data:
        // plaintext that genuinely ends in 0x00 loses those bytes. This is
        // the wire contract, not a bug to fix here.
        let decryptor = test_decryptor();
        let mut plaintext = b"ends in zeros...".to_vec();
        plaintext.extend_from_slice(&[0u8; 16]);
        assert_eq!(plaintext.len() % CIPHER_BLOCK_SIZE, 0);

        let ciphertext = decryptor.encrypt(&plaintext);
        let recovered = decryptor.decrypt_text(&ciphertext).unwrap();
        assert_eq!(recovered.as_bytes(), b"ends in zeros...");
    }
}
