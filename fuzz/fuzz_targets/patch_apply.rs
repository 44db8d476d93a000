#![no_main]

use jd_fuzz::PatchApplyInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: PatchApplyInput| {
    jd_fuzz::fuzz_patch_apply(&input.document, &input.diff_text);
});
