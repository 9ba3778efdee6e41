#![no_main]
use emitfmt_core::{
    Arg, ArgCursor, BufferSink, check_signature, extract_signature, measure, render,
    render_to_vec,
};
use libfuzzer_sys::fuzz_target;

// First byte picks a buffer capacity, the rest is the format string.
// Arguments are a fixed mix so most directives find something to consume.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, fmt)) = data.split_first() else {
        return;
    };
    let args = [
        Arg::Int(-7),
        Arg::Str(b"fuzz"),
        Arg::Double(1234.5678),
        Arg::Long(i64::MIN),
        Arg::Ptr(0x1000),
        Arg::Int(3),
        Arg::Double(f64::NAN),
    ];

    let full = render_to_vec(fmt, &args);
    let measured = measure(fmt, &args);

    match (&full, &measured) {
        (Ok(bytes), Ok(len)) => assert_eq!(bytes.len(), *len),
        (Err(a), Err(b)) => assert_eq!(a.class(), b.class()),
        _ => panic!("measure and render disagree: {full:?} vs {measured:?}"),
    }

    let mut storage = vec![0u8; usize::from(cap)];
    let mut sink = BufferSink::new(&mut storage);
    let bounded = render(&mut sink, fmt, &mut ArgCursor::new(&args));
    if let (Ok(bytes), Ok(len)) = (&full, &bounded) {
        assert_eq!(bytes.len(), *len);
        assert_eq!(sink.written(), &bytes[..sink.written().len()]);
    }

    // Anything that renders has a signature no longer than the argument list.
    if full.is_ok() {
        match extract_signature(fmt, 64) {
            Ok(tags) => {
                assert!(tags.len() <= args.len());
                assert!(check_signature(fmt, &tags).is_ok());
            }
            Err(err) => panic!("render succeeded but extraction failed: {err}"),
        }
    }
});
