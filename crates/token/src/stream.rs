//! The multipart block-cipher state machine
//!
//! A [`CipherStream`] follows the PKCS#11 streaming contract:
//!
//! * `update` only ever emits whole blocks; a trailing partial block is
//!   buffered until more input arrives.
//! * When decrypting with padding, the last whole block is always held back,
//!   because only `finish` can tell whether it carries the padding.
//! * `finish` flushes the buffer, adding PKCS#7 padding on encrypt and
//!   verifying and stripping it on decrypt.
//! * Whenever the destination is too small, the call fails with
//!   `BufferTooSmall` and the stream is left exactly as it was.

use zeroize::Zeroize;

use streamcheck_api::{Direction, Error, Result};
use streamcheck_params::symmetric::MAX_BLOCK_SIZE;
use streamcheck_params::CipherMode;

use crate::block::BlockEngine;

/// One in-progress encrypt or decrypt operation
#[derive(Clone)]
pub struct CipherStream {
    engine: BlockEngine,
    direction: Direction,
    mode: CipherMode,
    /// IV, then the previous ciphertext block
    chain: Vec<u8>,
    /// Input not yet transformed
    pending: Vec<u8>,
}

impl CipherStream {
    /// Start a stream; `iv` must match the mode
    pub fn new(engine: BlockEngine, direction: Direction, mode: CipherMode, iv: &[u8]) -> Result<Self> {
        let expected = if mode.needs_iv() { engine.block_size() } else { 0 };
        if mode == CipherMode::KeyGen || iv.len() != expected {
            return Err(Error::MechanismParamInvalid {
                context: "cipher stream",
                expected,
                actual: iv.len(),
            });
        }

        Ok(Self {
            chain: iv.to_vec(),
            pending: Vec::with_capacity(2 * engine.block_size()),
            engine,
            direction,
            mode,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn block_size(&self) -> usize {
        self.engine.block_size()
    }

    /// Bytes currently buffered inside the stream
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    fn withholds_last_block(&self) -> bool {
        self.direction == Direction::Decrypt && self.mode.is_padded()
    }

    /// How many bytes `update` would emit for `input_len` more input bytes
    pub fn update_len(&self, input_len: usize) -> usize {
        let bs = self.block_size();
        let total = self.pending.len() + input_len;
        if self.withholds_last_block() {
            total.saturating_sub(1) / bs * bs
        } else {
            total / bs * bs
        }
    }

    /// Feed more input, writing every block that became complete
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let needed = self.update_len(input.len());
        if output.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: output.len(),
            });
        }

        let mut data = core::mem::take(&mut self.pending);
        data.extend_from_slice(input);
        let out = &mut output[..needed];
        out.copy_from_slice(&data[..needed]);
        self.pending.extend_from_slice(&data[needed..]);
        data.zeroize();

        let bs = self.block_size();
        for block in out.chunks_exact_mut(bs) {
            transform(&self.engine, self.mode, self.direction, &mut self.chain, block);
        }
        Ok(needed)
    }

    /// Flush the stream
    ///
    /// On success the stream is spent; callers drop it afterwards.
    pub fn finish(&mut self, output: &mut [u8]) -> Result<usize> {
        let bs = self.block_size();
        let mut block = [0u8; MAX_BLOCK_SIZE];
        let mut chain = self.chain.clone();

        let produced = match (self.direction, self.mode.is_padded()) {
            (Direction::Encrypt, true) => {
                let rem = self.pending.len();
                let pad = (bs - rem) as u8;
                block[..rem].copy_from_slice(&self.pending);
                block[rem..bs].fill(pad);
                transform(&self.engine, self.mode, self.direction, &mut chain, &mut block[..bs]);
                bs
            }
            (Direction::Decrypt, true) => {
                if self.pending.len() != bs {
                    return Err(Error::EncryptedDataLenRange {
                        context: "cipher_final",
                        len: self.pending.len(),
                    });
                }
                block[..bs].copy_from_slice(&self.pending);
                transform(&self.engine, self.mode, self.direction, &mut chain, &mut block[..bs]);
                let pad = usize::from(block[bs - 1]);
                if pad == 0 || pad > bs || block[bs - pad..bs].iter().any(|&b| usize::from(b) != pad) {
                    block.zeroize();
                    return Err(Error::EncryptedDataInvalid("cipher_final"));
                }
                bs - pad
            }
            (Direction::Encrypt, false) if !self.pending.is_empty() => {
                return Err(Error::DataLenRange {
                    context: "cipher_final",
                    len: self.pending.len(),
                });
            }
            (Direction::Decrypt, false) if !self.pending.is_empty() => {
                return Err(Error::EncryptedDataLenRange {
                    context: "cipher_final",
                    len: self.pending.len(),
                });
            }
            (_, false) => 0,
        };

        if output.len() < produced {
            block.zeroize();
            return Err(Error::BufferTooSmall {
                needed: produced,
                available: output.len(),
            });
        }
        output[..produced].copy_from_slice(&block[..produced]);
        block.zeroize();
        self.chain.zeroize();
        self.chain = chain;
        self.pending.zeroize();
        self.pending.clear();
        Ok(produced)
    }

    /// Single-part operation: update over all of `input`, then finish
    ///
    /// Runs on a copy so that a short destination leaves the stream intact.
    pub fn one_shot(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut trial = self.clone();
        let mut scratch = vec![0u8; trial.update_len(input.len()) + trial.block_size()];
        let result = trial
            .update(input, &mut scratch)
            .and_then(|n| Ok(n + trial.finish(&mut scratch[n..])?))
            .and_then(|n| {
                if output.len() < n {
                    Err(Error::BufferTooSmall {
                        needed: n,
                        available: output.len(),
                    })
                } else {
                    output[..n].copy_from_slice(&scratch[..n]);
                    Ok(n)
                }
            });
        scratch.zeroize();
        let n = result?;
        *self = trial;
        Ok(n)
    }
}

impl Drop for CipherStream {
    fn drop(&mut self) {
        self.chain.zeroize();
        self.pending.zeroize();
    }
}

/// Apply one block step of `mode`, updating the chaining value
fn transform(engine: &BlockEngine, mode: CipherMode, direction: Direction, chain: &mut [u8], block: &mut [u8]) {
    match (mode, direction) {
        (CipherMode::Ecb, Direction::Encrypt) => engine.encrypt_block(block),
        (CipherMode::Ecb, Direction::Decrypt) => engine.decrypt_block(block),
        (_, Direction::Encrypt) => {
            block.iter_mut().zip(chain.iter()).for_each(|(b, c)| *b ^= c);
            engine.encrypt_block(block);
            chain.copy_from_slice(block);
        }
        (_, Direction::Decrypt) => {
            let mut saved = [0u8; MAX_BLOCK_SIZE];
            saved[..block.len()].copy_from_slice(block);
            engine.decrypt_block(block);
            block.iter_mut().zip(chain.iter()).for_each(|(b, c)| *b ^= c);
            chain.copy_from_slice(&saved[..block.len()]);
        }
    }
}
