//! Opening URLs outside the terminal.

use std::io;

/// Opens a URL for the user.
pub trait UrlOpener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// The platform's default browser.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records URLs instead of opening them.
    #[derive(Debug, Default)]
    pub struct RecordingOpener {
        pub opened: RefCell<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingOpener {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl UrlOpener for RecordingOpener {
        fn open(&self, url: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Unsupported, "no browser"));
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }
}
