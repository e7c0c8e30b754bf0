mod common;

use common::{simulated_config, simulated_display, IDLE};
use smartscreen_communication::DisplayManager;
use smartscreen_core::{BarStyle, Orientation, ParameterError, Rgb, TextStyle};
use smartscreen_settings::{ResolvedTheme, Theme};
use std::fs;
use std::sync::Arc;

const THEME: &str = r#"
[display]
orientation = "landscape"
rgb_led = [0, 128, 255]

[defaults]
font_size = 12
font_color = [255, 255, 255]

[static_text.title]
text = "CPU"
x = 10
y = 10

[widgets.text.cpu_load]
x = 100
y = 50
[widgets.text.cpu_load.threshold]
value = 80
font_color = [255, 0, 0]
font_size = 20

[widgets.bar.cpu_load]
x = 10
y = 100
width = 100
height = 10
bar_color = [0, 255, 0]
[widgets.bar.cpu_load.threshold]
value = 90
bar_color = [255, 0, 0]
"#;

fn theme() -> (tempfile::TempDir, ResolvedTheme) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("theme.toml"), THEME).unwrap();
    let theme = Theme::load_from_dir(dir.path()).unwrap();
    (dir, theme)
}

#[test]
fn test_text_threshold_overrides_style() {
    let (_dir, theme) = theme();
    let config = simulated_config();
    let (lcd, screen, rasterizer) = simulated_display(&config);
    let manager = DisplayManager::new(Arc::new(lcd), theme.clone(), config);
    let widget = &theme.text_widgets["cpu_load"];

    manager.display_text_widget(" 42%", 42.0, widget).unwrap();
    manager.display_text_widget(" 85%", 85.0, widget).unwrap();
    assert!(manager.lcd().wait_idle(IDLE));

    let requests = rasterizer.requests.lock();
    assert_eq!(requests[0].style.font_color, Rgb::WHITE);
    assert_eq!(requests[0].style.font_size, 12);
    assert_eq!(requests[1].style.font_color, Rgb::new(255, 0, 0));
    assert_eq!(requests[1].style.font_size, 20);
    // the widget itself is untouched
    assert_eq!(widget.style.font_color, Rgb::WHITE);

    assert_eq!(screen.pixel(100, 50), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn test_bar_threshold_overrides_color() {
    let (_dir, theme) = theme();
    let config = simulated_config();
    let (lcd, screen, _) = simulated_display(&config);
    let manager = DisplayManager::new(Arc::new(lcd), theme.clone(), config);
    let widget = &theme.bar_widgets["cpu_load"];

    manager.display_bar_widget(50.0, widget).unwrap();
    assert!(manager.lcd().wait_idle(IDLE));
    assert_eq!(screen.pixel(10, 100), Some(Rgb::new(0, 255, 0)));
    // unfilled half shows the black default background
    assert_eq!(screen.pixel(70, 105), Some(Rgb::BLACK));

    manager.display_bar_widget(95.0, widget).unwrap();
    assert!(manager.lcd().wait_idle(IDLE));
    assert_eq!(screen.pixel(10, 100), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn test_initialize_display_sequence() {
    let (_dir, theme) = theme();
    let config = simulated_config();
    let (lcd, screen, _) = simulated_display(&config);
    let manager = DisplayManager::new(Arc::new(lcd), theme, config.clone());

    manager.initialize_display().unwrap();
    manager.display_static_text().unwrap();
    assert!(manager.lcd().wait_idle(IDLE));

    let tags: Vec<_> = screen.history().iter().map(|(_, tag)| *tag).collect();
    assert_eq!(
        tags,
        vec![
            "reset",
            "init",
            "screen-on",
            "set-brightness",
            "set-led-color",
            "set-orientation",
            "display-text-bitmap",
        ]
    );

    let state = manager.lcd().device_state();
    assert!(state.initialized);
    assert_eq!(state.led, Rgb::new(0, 128, 255));
    assert_eq!(state.brightness, config.brightness);
    assert_eq!(state.orientation, Orientation::Landscape);

    manager.turn_off().unwrap();
    assert!(manager.lcd().wait_idle(IDLE));
    let state = manager.lcd().device_state();
    assert!(!state.power);
    assert_eq!(state.led, Rgb::BLACK);
}

#[test]
fn test_invalid_geometry_is_rejected_before_queueing() {
    let (lcd, screen, rasterizer) = simulated_display(&simulated_config());
    let bar = BarStyle::default();

    let err = lcd
        .display_progress_bar(0, 0, 0, 10, 5.0, 0.0, 10.0, &bar)
        .unwrap_err();
    assert!(matches!(
        err,
        smartscreen_core::Error::Parameter(ParameterError::InvalidSize { .. })
    ));

    let err = lcd
        .display_progress_bar(-1, 0, 10, 10, 5.0, 0.0, 10.0, &bar)
        .unwrap_err();
    assert!(matches!(
        err,
        smartscreen_core::Error::Parameter(ParameterError::OutOfBounds { .. })
    ));

    let err = lcd
        .display_progress_bar(300, 0, 50, 10, 5.0, 0.0, 10.0, &bar)
        .unwrap_err();
    assert!(matches!(
        err,
        smartscreen_core::Error::Parameter(ParameterError::Overflow { .. })
    ));

    let err = lcd
        .display_progress_bar(0, 0, 10, 10, 5.0, 10.0, 10.0, &bar)
        .unwrap_err();
    assert!(matches!(
        err,
        smartscreen_core::Error::Parameter(ParameterError::InvalidRange { .. })
    ));

    let text = TextStyle::default();
    assert!(lcd.display_text("", 0, 0, &text).unwrap_err().is_parameter_error());
    assert!(lcd
        .display_text("hi", 320, 0, &text)
        .unwrap_err()
        .is_parameter_error());
    assert!(lcd
        .display_bitmap(image::RgbImage::new(4, 4), 0, 0, -1, 4)
        .unwrap_err()
        .is_parameter_error());

    assert!(lcd.wait_idle(IDLE));
    assert!(screen.history().is_empty());
    assert!(rasterizer.requests.lock().is_empty());

    // rejected calls leave the display usable
    lcd.display_progress_bar(0, 0, 10, 10, 5.0, 0.0, 10.0, &bar)
        .unwrap();
    assert!(lcd.wait_idle(IDLE));
    assert_eq!(screen.history().len(), 1);
}
