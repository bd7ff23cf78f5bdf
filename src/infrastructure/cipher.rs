use crate::config::EncryptionKey;
use crate::domain::gateway::EncryptedField;
use crate::error::{PaymentError, Result};
use aes::Aes256;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub const IV_LENGTH: usize = 16;
const BLOCK_SIZE: usize = 16;

/// Encrypts card numbers with AES-256-CBC under the pre-shared key.
///
/// Every call draws a fresh random IV, so encrypting the same card twice
/// yields unrelated ciphertexts.
#[derive(Clone)]
pub struct CardCipher {
    key: EncryptionKey,
}

impl CardCipher {
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedField> {
        let iv: [u8; IV_LENGTH] = rand::random();
        self.encrypt_with_iv(plaintext, iv)
    }

    fn encrypt_with_iv(&self, plaintext: &str, iv: [u8; IV_LENGTH]) -> Result<EncryptedField> {
        let data = plaintext.as_bytes();
        let key = *self.key.as_bytes();
        let encryptor = Aes256CbcEnc::new(&key.into(), &iv.into());

        // PKCS#7 always adds between one and sixteen bytes.
        let mut buffer = Vec::with_capacity(data.len() + BLOCK_SIZE);
        buffer.extend_from_slice(data);
        buffer.resize(data.len() + BLOCK_SIZE, 0);

        let ciphertext = encryptor
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
            .map_err(|_| PaymentError::Encryption("padding buffer too small".to_string()))?;

        Ok(EncryptedField {
            ciphertext: hex::encode(ciphertext),
            iv: hex::encode(iv),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockDecryptMut;

    type Aes256CbcDec = cbc::Decryptor<Aes256>;

    fn cipher() -> CardCipher {
        CardCipher::new(EncryptionKey::from_bytes([7u8; EncryptionKey::LENGTH]))
    }

    fn decrypt(key: &[u8; 32], field: &EncryptedField) -> String {
        let iv: [u8; IV_LENGTH] = hex::decode(&field.iv).unwrap().try_into().unwrap();
        let mut buffer = hex::decode(&field.ciphertext).unwrap();
        let plain = Aes256CbcDec::new(&(*key).into(), &iv.into())
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .unwrap();
        String::from_utf8(plain.to_vec()).unwrap()
    }

    #[test]
    fn test_encrypt_round_trips_under_shared_key() {
        let encrypted = cipher().encrypt("4111111111111111").unwrap();
        assert_eq!(decrypt(&[7u8; 32], &encrypted), "4111111111111111");
    }

    #[test]
    fn test_ciphertext_is_hex_and_block_aligned() {
        let encrypted = cipher().encrypt("4111111111111111").unwrap();
        // 16 bytes of input plus a full padding block
        assert_eq!(encrypted.ciphertext.len(), 64);
        assert_eq!(encrypted.iv.len(), IV_LENGTH * 2);
        assert!(encrypted.ciphertext.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(encrypted.ciphertext, "4111111111111111");
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let cipher = cipher();
        let first = cipher.encrypt("4111111111111111").unwrap();
        let second = cipher.encrypt("4111111111111111").unwrap();
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        let cipher = cipher();
        let a = cipher.encrypt_with_iv("4111", [1u8; IV_LENGTH]).unwrap();
        let b = cipher.encrypt_with_iv("4111", [1u8; IV_LENGTH]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iv, "01".repeat(IV_LENGTH));
    }
}
