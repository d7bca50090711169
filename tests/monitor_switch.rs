//! Monitor auto-switch at the vertical blank

use tos_screen::constants::{ST_HIGH, ST_LOW, ST_MEDIUM, TT_HIGH, TT_MEDIUM};
use tos_screen::driver::AtariScreen;
use tos_screen::driver::atari::regs::{DMASOUND_CTRL, FALCON_MONITOR, MFP_GPIP};
use tos_screen::hal::StubBoard;
use tos_screen::screen::Screen;
use tos_screen::screen::config::ScreenConfig;
use tos_screen::screen::mode::MonitorType;

const MONO: u8 = 0x00;
const COLOUR: u8 = 0x80;

fn booted(config: &ScreenConfig, gpip: u8) -> Screen<AtariScreen, StubBoard> {
    let mut board = StubBoard::atari();
    board.poke8(MFP_GPIP, gpip);
    board.set_allocation(Some(0x0010_0000));
    let mut screen = Screen::new(config, board);
    assert_eq!(screen.init(), Ok(()));
    screen.enable_vbl_processing();
    screen
}

#[test]
fn colour_to_mono_restarts_once() {
    for config in [ScreenConfig::atari_st(), ScreenConfig::atari_ste()] {
        let mut screen = booted(&config, COLOUR);
        assert_eq!(screen.current_resolution(), ST_LOW);

        screen.platform_mut().poke8(MFP_GPIP, MONO);
        assert!(screen.vertical_blank());
        assert!(screen.vertical_blank());

        assert_eq!(screen.platform().restarts(), 1);
        assert_eq!(screen.current_resolution(), ST_HIGH);
    }
}

#[test]
fn mono_to_colour_uses_the_default_rez() {
    let config = ScreenConfig::atari_st().with_default_rez(ST_MEDIUM);
    let mut screen = booted(&config, MONO);
    assert_eq!(screen.current_resolution(), ST_HIGH);

    screen.platform_mut().poke8(MFP_GPIP, COLOUR);
    assert!(screen.vertical_blank());
    assert_eq!(screen.current_resolution(), ST_MEDIUM);
    assert_eq!(screen.platform().restarts(), 1);
}

#[test]
fn mono_default_falls_back_to_the_colour_rez() {
    let config = ScreenConfig::atari_tt().with_default_rez(TT_HIGH);
    let mut screen = booted(&config, MONO);
    assert_eq!(screen.current_resolution(), TT_HIGH);

    // ST low, not TT medium
    screen.platform_mut().poke8(MFP_GPIP, COLOUR);
    assert!(screen.vertical_blank());
    assert_eq!(screen.current_resolution(), ST_LOW);
}

#[test]
fn matching_monitor_is_left_alone() {
    let mut screen = booted(&ScreenConfig::atari_tt(), COLOUR);
    for _ in 0..3 {
        assert!(screen.vertical_blank());
    }
    assert_eq!(screen.platform().restarts(), 0);
    assert_eq!(screen.current_resolution(), TT_MEDIUM);
}

#[test]
fn playing_dma_sound_inverts_the_sense_line() {
    // GPIP reads colour, but the DMA "playing" bit flips it
    let mut screen = booted(&ScreenConfig::atari_ste(), COLOUR);
    screen.platform_mut().poke8(DMASOUND_CTRL, 0x01);
    assert_eq!(screen.monitor_type(), MonitorType::Mono);

    screen.platform_mut().poke8(DMASOUND_CTRL, 0x00);
    assert_eq!(screen.monitor_type(), MonitorType::Color);
}

#[test]
fn falcon_never_switches() {
    let mut board = StubBoard::atari();
    board.poke8(FALCON_MONITOR, 0x80);
    board.set_allocation(Some(0x0010_0000));
    let mut screen: Screen<AtariScreen, _> = Screen::new(&ScreenConfig::atari_falcon(), board);
    assert_eq!(screen.init(), Ok(()));
    screen.enable_vbl_processing();
    let mode = screen.driver().videl_mode();

    // unplug VGA, plug a mono monitor
    screen.platform_mut().poke8(FALCON_MONITOR, 0x00);
    assert!(screen.vertical_blank());
    assert_eq!(screen.platform().restarts(), 0);
    assert_eq!(screen.driver().videl_mode(), mode);
    assert_eq!(screen.monitor_type(), MonitorType::Mono);
}
