use crate::core::config::data::{path_display, Config};
use crate::core::config::io::ConfigStore;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.server_url {
            Some(url) => println!("  server-url: {url}"),
            None => println!("  server-url: (unset, using {})", self.effective_server_url()),
        }
        match self.poll_interval_secs {
            Some(secs) => println!("  poll-interval: {secs}s"),
            None => println!(
                "  poll-interval: (unset, using {}s)",
                self.poll_interval().as_secs()
            ),
        }
        if let Ok(store) = ConfigStore::platform() {
            println!("  file: {}", path_display(store.path()));
        }
    }
}
