//! Browser shell demo application
//!
//! A main window with a location field and a "Go" button stacked vertically.
//! Typing updates the field's cached text, Enter or the button "navigates"
//! (logs the location) and Escape closes the window.
//!
//! Usage: `browser_app [config.toml|config.ron]`

use std::rc::Rc;

use native_window::events::{keys, Event};
use native_window::foundation::logging;
use native_window::platform::NativeHandle;
use native_window::prelude::*;
use native_window::resources::stock;

const FRAME_CLASS: &str = "BrowserFrame";
const DEFAULT_CONFIG_PATH: &str = "browser.toml";

pub struct BrowserApp {
    system: Rc<WindowSystem>,
    frame: Rc<VerticalLayout>,
    location: Rc<TextInput>,
    go: Rc<Button>,
}

impl BrowserApp {
    pub fn new(config: &ShellConfig) -> ShellResult<Self> {
        let system = Self::create_system(config.contracts);

        log::info!("Creating main window...");
        let frame_config = config.main_window.to_window_config(FRAME_CLASS);
        let frame = VerticalLayout::create(&system, &frame_config)?;
        frame.set_content_margins(config.main_window.content_margins)?;
        frame.set_content_spacing(config.main_window.content_spacing)?;
        frame.window().set_icon(Icon::load(&system, stock::APPLICATION_ICON)?);

        let parent = frame.window().native_handle();
        let location = TextInput::create(&system, parent, "", Size::new(200, 24))?;
        let go = Button::create(&system, parent, "Go", Size::new(80, 28))?;
        location
            .window()
            .set_font(Font::load(&system, stock::DEFAULT_GUI_FONT)?);
        go.window().set_font(Font::load(&system, stock::DEFAULT_GUI_FONT)?);

        frame.add_element_with(&location, ItemConstraints::new().fill_width())?;
        frame.add_element(&go)?;
        log::info!("Main window created with {} items", frame.len());

        Ok(Self {
            system,
            frame,
            location,
            go,
        })
    }

    #[cfg(windows)]
    fn create_system(contracts: ContractPolicy) -> Rc<WindowSystem> {
        WindowSystem::native(contracts)
    }

    #[cfg(not(windows))]
    fn create_system(contracts: ContractPolicy) -> Rc<WindowSystem> {
        log::warn!("No native windowing on this platform, running headless");
        WindowSystem::headless(contracts).0
    }

    fn connect(&self) {
        self.location
            .text_changed()
            .subscribe(|text| log::debug!("Location edited: {text}"));
        self.location
            .enter_pressed()
            .subscribe(|text| log::info!("Navigating to {text}"));

        let location = Rc::downgrade(&self.location);
        self.go.clicked().subscribe(move |()| {
            if let Some(location) = location.upgrade() {
                log::info!("Navigating to {}", location.text());
            }
        });
    }

    pub fn run(self) -> ShellResult<i32> {
        self.connect();
        self.frame.window().show(true);

        let frame_handle = self.frame.window().native_handle();
        if cfg!(not(windows)) {
            // Nothing will ever type into a headless window
            self.system.platform().post(Event::close(frame_handle));
        }

        let mut message_loop = MessageLoop::new(&self.system);
        let platform = self.system.platform_rc();
        message_loop.add_filter(move |event| close_on_escape(platform.as_ref(), frame_handle, event));

        Ok(message_loop.run()?)
    }
}

fn close_on_escape(platform: &dyn Platform, frame: NativeHandle, event: &Event) -> Filter {
    if event.as_key().is_some_and(|key| key.key_code() == keys::ESCAPE) {
        platform.post(Event::close(frame));
        Filter::Discard
    } else {
        Filter::Keep
    }
}

fn load_config() -> ShellResult<ShellConfig> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ShellConfig::load_or_default(&path)?;
    config.validate()?;
    Ok(config)
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };
    logging::init_with_level(&config.logging.level);
    log::info!("Starting browser shell...");

    let exit_code = match BrowserApp::new(&config).and_then(BrowserApp::run) {
        Ok(code) => code,
        Err(e) => {
            log::error!("Browser shell failed: {e}");
            1
        }
    };
    std::process::exit(exit_code);
}
