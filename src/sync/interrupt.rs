//! VBL masking helpers.

use crate::hal::InterruptControl;

/// Run `f` with the VBL masked, restoring the previous level afterwards.
///
/// Register sequences that the VBL handler could observe half-written
/// (mode, palette, sense-line sampling) go through here.
pub fn without_vbl<I, F, R>(hw: &mut I, f: F) -> R
where
    I: InterruptControl + ?Sized,
    F: FnOnce(&mut I) -> R,
{
    let saved = hw.mask_vbl();
    let result = f(hw);
    hw.restore(saved);
    result
}

/// Run `f` with the VBL allowed to fire (used by the blank wait).
///
/// On the ST this also lets the MFP through, exactly as TOS does; the MFP
/// must be set up before anything waits for a blank.
pub fn with_vbl_allowed<I, F, R>(hw: &mut I, f: F) -> R
where
    I: InterruptControl + ?Sized,
    F: FnOnce(&mut I) -> R,
{
    let saved = hw.allow_vbl();
    let result = f(hw);
    hw.restore(saved);
    result
}
