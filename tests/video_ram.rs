//! Video RAM sizing, boot allocation and Falcon reallocation

use tos_screen::driver::atari::regs::{FALCON_MONITOR, MFP_GPIP};
use tos_screen::driver::{AtariScreen, ScreenRequest};
use tos_screen::errors::{ResourceError, ScreenError};
use tos_screen::hal::StubBoard;
use tos_screen::screen::Screen;
use tos_screen::screen::config::ScreenConfig;
use tos_screen::screen::vram::VideoRamRegion;

fn colour_board(allocation: u32) -> StubBoard {
    let mut board = StubBoard::atari();
    board.poke8(MFP_GPIP, 0x80);
    board.set_allocation(Some(allocation));
    board
}

fn vga_falcon(allocation: u32) -> Screen<AtariScreen, StubBoard> {
    let mut board = StubBoard::atari();
    board.poke8(FALCON_MONITOR, 0x80);
    board.set_allocation(Some(allocation));
    let mut screen = Screen::new(&ScreenConfig::atari_falcon(), board);
    assert_eq!(screen.init(), Ok(()));
    screen
}

#[test]
fn tt_boot_adopts_the_allocated_block() {
    let mut screen: Screen<AtariScreen, _> = Screen::new(&ScreenConfig::atari_tt(), colour_board(0x0010_0000));
    assert_eq!(screen.init(), Ok(()));

    assert_eq!(screen.platform().last_allocation(), Some((153_856, true)));
    assert_eq!(screen.logical_base(), 0x0010_0000);
    assert_eq!(screen.physical_base(), 0x0010_0000);
    assert_eq!(screen.video_ram(), Some(VideoRamRegion::allocated(0x0010_0000, 153_856)));
}

#[test]
fn shifter_sizes_grow_with_the_frame() {
    let mut sizes = Vec::new();
    for rez in [0, 1, 2, 4, 6, 7] {
        let mut screen: Screen<AtariScreen, _> =
            Screen::new(&ScreenConfig::atari_tt(), colour_board(0x0010_0000));
        assert_eq!(screen.init(), Ok(()));
        assert_eq!(screen.set_screen(ScreenRequest::rez(rez, -1)), Ok(0));

        let raw = screen.current_mode().geometry.frame_bytes();
        let size = screen.calc_vram_size();
        assert!(size >= raw, "rez {}: {} < {}", rez, size, raw);
        sizes.push((raw, size));
    }

    sizes.sort();
    for pair in sizes.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "{:?}", pair);
    }
}

#[test]
fn videl_sizes_grow_with_the_frame() {
    let mut sizes = Vec::new();
    // 2, 4, 8 and 16 bpp at 320 columns, then 640 columns up to 8 bpp
    for mode in [0x0011, 0x0012, 0x0013, 0x0014, 0x0019, 0x001a, 0x001b] {
        let mut screen = vga_falcon(0x0010_0000);
        assert!(screen.set_video_mode(mode).is_ok());

        let raw = screen.current_mode().geometry.frame_bytes();
        let size = screen.calc_vram_size();
        assert!(size >= raw);
        sizes.push((raw, size));
    }

    sizes.sort();
    for pair in sizes.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "{:?}", pair);
    }
}

#[test]
fn failed_reallocation_keeps_the_current_screen() {
    let mut screen = vga_falcon(0x0010_0000);
    let region = screen.video_ram();
    let mode = screen.driver().videl_mode();
    screen.platform_mut().set_reallocation(None);

    // 640x480, 256 colours
    let result = screen.set_screen(ScreenRequest::rez(3, 0x001b));
    assert_eq!(
        result,
        Err(ScreenError::Resource(ResourceError::VideoRamExhausted { requested: 307_200 }))
    );
    assert_eq!(screen.set_screen_legacy(ScreenRequest::rez(3, 0x001b)), -1);

    assert_eq!(screen.video_ram(), region);
    assert_eq!(screen.logical_base(), 0x0010_0000);
    assert_eq!(screen.physical_base(), 0x0010_0000);
    assert_eq!(screen.driver().videl_mode(), mode);
    assert_eq!(screen.platform().last_reallocation(), Some(307_200));
}

#[test]
fn successful_reallocation_moves_both_bases() {
    let mut screen = vga_falcon(0x0010_0000);
    let boot_mode = screen.driver().videl_mode().bits() as i16;
    screen.platform_mut().set_reallocation(Some(0x0020_0000));

    assert_eq!(screen.set_screen(ScreenRequest::rez(3, 0x001b)), Ok(boot_mode));
    assert_eq!(screen.video_ram(), Some(VideoRamRegion::allocated(0x0020_0000, 307_200)));
    assert_eq!(screen.logical_base(), 0x0020_0000);
    assert_eq!(screen.physical_base(), 0x0020_0000);
    assert_eq!(screen.driver().videl_mode().bits(), 0x001b);
}

#[test]
fn explicit_addresses_suppress_reallocation() {
    let mut screen = vga_falcon(0x0010_0000);
    let request = ScreenRequest {
        logical: 0x0030_0000,
        physical: 0x0030_0000,
        rez: 3,
        mode: 0x001b,
    };

    assert!(screen.set_screen(request).is_ok());
    assert_eq!(screen.platform().reallocation_calls(), 0);
    assert_eq!(screen.physical_base(), 0x0030_0000);
    assert_eq!(screen.logical_base(), 0x0030_0000);
}

#[test]
fn keep_sentinel_addresses_suppress_reallocation() {
    let mut screen = vga_falcon(0x0010_0000);
    screen.platform_mut().set_reallocation(Some(0x0020_0000));
    let keep = ScreenRequest {
        logical: u32::MAX,
        physical: u32::MAX,
        rez: 3,
        mode: 0x001b,
    };

    assert!(screen.set_screen(keep).is_ok());
    assert_eq!(screen.platform().reallocation_calls(), 0);
    assert_eq!(screen.logical_base(), 0x0010_0000);
    assert_eq!(screen.physical_base(), 0x0010_0000);
    assert_eq!(screen.driver().videl_mode().bits(), 0x001b);

    // both addresses at 0: the screen moves
    assert!(screen.set_screen(ScreenRequest::rez(3, 0x0019)).is_ok());
    assert_eq!(screen.platform().reallocation_calls(), 1);
    assert_eq!(screen.physical_base(), 0x0020_0000);
}
