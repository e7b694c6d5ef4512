use core::iter::zip;

use md5::digest::generic_array::GenericArray;
use md5::{Digest, Md5};

use super::{HeaderInfo, PacketFlags};


/// MD5 hash output size, in bytes.
const MD5_OUTPUT_SIZE: usize = 16;

fn xor_slices(output: &mut [u8], pseudo_pad: &[u8]) {
    for (out, pad) in zip(output, pseudo_pad) {
        *out ^= pad;
    }
}

/// (De)obfuscates a packet body in place, as specified in [RFC8907 section 4.5].
///
/// The pseudo-pad depends only on the session id, key, version and sequence number of `header`,
/// so applying this twice with the same key/header restores the original body. If the header
/// has the [`UNENCRYPTED`](PacketFlags::UNENCRYPTED) flag set, the body is left untouched.
///
/// [RFC8907 section 4.5]: https://www.rfc-editor.org/rfc/rfc8907.html#name-data-obfuscation
pub fn toggle_cipher(body: &mut [u8], key: &[u8], header: &HeaderInfo) {
    if header.has_flag(PacketFlags::UNENCRYPTED) {
        return;
    }

    // prehash common prefix for all hash invocations
    // prefix: session id -> key -> version -> sequence number
    let mut prefix_hasher = Md5::new();
    prefix_hasher.update(header.session_id().to_be_bytes());
    prefix_hasher.update(key);
    prefix_hasher.update([u8::from(header.version()), header.sequence_number()]);

    let mut pseudo_pad = [0u8; MD5_OUTPUT_SIZE];

    for (index, chunk) in body.chunks_mut(MD5_OUTPUT_SIZE).enumerate() {
        let mut hasher = prefix_hasher.clone();

        // every chunk after the first also hashes the previous pad chunk
        if index > 0 {
            hasher.update(pseudo_pad);
        }

        hasher.finalize_into(GenericArray::from_mut_slice(&mut pseudo_pad));
        xor_slices(chunk, &pseudo_pad);
    }
}
