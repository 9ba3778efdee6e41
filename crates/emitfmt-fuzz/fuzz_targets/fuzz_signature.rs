#![no_main]
use emitfmt_core::{TypeTag, check_signature, extract_signature_into};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut tags = [TypeTag::INT; 16];
    let Ok(count) = extract_signature_into(data, &mut tags) else {
        return;
    };
    let tags = &tags[..count];
    assert!(check_signature(data, tags).is_ok());

    // Dropping the last tag must always be rejected.
    if let Some((_, shorter)) = tags.split_last() {
        assert!(check_signature(data, shorter).is_err());
    }
});
