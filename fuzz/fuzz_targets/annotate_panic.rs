#![no_main]
use libfuzzer_sys::fuzz_target;
use texattr_log::{AnnotateOptions, KnownFiles, LogAnnotator, RunSelector};

fuzz_target!(|data: &[u8]| {
    // Errors are expected on malformed nesting; panics are not.
    let oracle: KnownFiles = ["./a.tex", "./b.sty", "./fig.png", "a.tex"]
        .into_iter()
        .collect();
    let options = AnnotateOptions::default();
    let mut annotator = LogAnnotator::new(oracle, options.clone());
    let mut lines = Vec::new();
    for chunk in data.split_inclusive(|&b| b == b'\n') {
        match annotator.feed(chunk) {
            Ok(ready) => lines.extend(ready),
            Err(_) => return,
        }
    }
    if let Ok(rest) = annotator.finish() {
        lines.extend(rest);
        let _ = RunSelector::from_options(&options).select(lines);
    }
});
