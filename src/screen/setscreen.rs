// src/screen/setscreen.rs

//! Setscreen protocol and the blank wait shared by the drivers

use crate::constants::UNCHANGED;
use crate::diagnostics::DIAGNOSTICS;
use crate::driver::{ModeSwitch, ScreenRequest};
use crate::errors::{HardwareError, ResourceError, Result, ScreenError};
use crate::hal::{Platform, TimeoutConfig, TimeoutResult, poll_with_timeout};
use crate::screen::mode::{Geometry, ModeCode, check_rez_range};
use crate::screen::state::ScreenState;
use crate::screen::vram::VideoRamRegion;
use crate::sync::{with_vbl_allowed, without_vbl};

/// Wait until the frame counter moves.
///
/// The VBL is let through for the duration of the wait.
pub fn vsync<P: Platform>(hw: &mut P) -> core::result::Result<(), HardwareError> {
    let result = with_vbl_allowed(hw, |hw| {
        let start = hw.frame_count();
        poll_with_timeout(TimeoutConfig::vbl_wait(), || hw.frame_count() != start)
    });

    match result {
        TimeoutResult::Ok(()) => Ok(()),
        TimeoutResult::Timeout { iterations } => {
            DIAGNOSTICS.record_vbl_wait_timeout();
            log::warn!("no vertical blank after {} polls", iterations);
            Err(HardwareError::VblTimeout)
        }
    }
}

/// Hand the new geometry to line-A and the VT52 console.
///
/// VBL processing is held off meanwhile. The semaphore is decremented
/// rather than cleared so a call during boot does not open the gate early.
pub fn reinit_services<P: Platform>(hw: &mut P, state: &mut ScreenState, geometry: Geometry) {
    log::debug!(
        "reinit services: {} planes, {}x{}",
        geometry.planes,
        geometry.width,
        geometry.height
    );
    state.vblsem -= 1;
    hw.reinit(geometry);
    state.vblsem += 1;
}

/// Setscreen for drivers whose mode change is "validate, maybe
/// reallocate, wait, program, resync".
///
/// Nothing is mutated when the request is rejected: the resolution is
/// validated before either address is applied.
pub fn standard_set_screen<D, P>(
    driver: &mut D,
    hw: &mut P,
    state: &mut ScreenState,
    request: ScreenRequest,
) -> Result<i16>
where
    D: ModeSwitch,
    P: Platform,
{
    // resolution changes are forbidden once the screen was hacked
    let plan = if state.hacked || request.rez == UNCHANGED {
        None
    } else {
        let planned = check_rez_range(request.rez)
            .and_then(|()| driver.plan(hw, request.rez, request.mode));
        match planned {
            Ok(plan) => Some(plan),
            Err(err) => {
                DIAGNOSTICS.record_rejected_request();
                log::debug!("setscreen rejected: {}", err);
                return Err(err.into());
            }
        }
    };

    state.set_logical_if_valid(request.logical);
    if request.physical_given() {
        driver.set_phys_address(hw, request.physical);
    }

    let Some(plan) = plan else {
        return Ok(0);
    };

    if let Some(mode) = plan.mode {
        if plan.may_reallocate && request.addresses_omitted() {
            let size = driver.vram_size_for(ModeCode::Mode(mode)).unwrap_or(0);
            match hw.reallocate_screen(size) {
                Some(address) => {
                    DIAGNOSTICS.record_vram_allocation(true);
                    log::debug!("screen reallocated to {:#010x} ({} bytes)", address, size);
                    state.vram = Some(VideoRamRegion::allocated(address, size));
                    state.logical_base = address;
                    driver.set_phys_address(hw, address);
                }
                None => {
                    DIAGNOSTICS.record_vram_allocation(false);
                    log::warn!("cannot reallocate {} bytes of video RAM, keeping current screen", size);
                    return Err(ScreenError::from(ResourceError::VideoRamExhausted { requested: size }));
                }
            }
        }
    }

    let old_mode = driver.previous_mode(&plan);

    // the shifter shows a plane-shift artefact if switched mid-frame
    for _ in 0..driver.vbl_settle_frames() {
        let _ = vsync(hw);
    }

    without_vbl(hw, |hw| driver.program(hw, &plan));
    DIAGNOSTICS.record_mode_switch();

    let geometry = driver.current_mode_info(&*hw).geometry;
    reinit_services(hw, state, geometry);

    Ok(old_mode)
}
