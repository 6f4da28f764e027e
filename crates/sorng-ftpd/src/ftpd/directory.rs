//! STAT <path>: status of a file, or of each entry of a directory.

use crate::ftpd::client::ClientHandler;
use crate::ftpd::connection::ControlStream;
use crate::ftpd::error::FtpdResult;
use crate::ftpd::protocol::*;

impl<S: ControlStream> ClientHandler<S> {
    pub(crate) async fn handle_stat_path(&mut self, path: &str) -> FtpdResult<()> {
        let info = match self.driver.stat(path).await {
            Ok(info) => info,
            Err(e) => {
                return self
                    .write_message(STATUS_ACTION_NOT_TAKEN, &format!("{}: {}", path, e))
                    .await
            }
        };

        let lines: Vec<String> = if info.is_dir() {
            match self.driver.read_dir(path).await {
                Ok(entries) => entries.iter().map(|e| e.fact_line()).collect(),
                Err(e) => {
                    return self
                        .write_message(STATUS_ACTION_NOT_TAKEN, &format!("{}: {}", path, e))
                        .await
                }
            }
        } else {
            vec![info.fact_line()]
        };

        self.write_multiline(
            STATUS_FILE_STATUS,
            &format!("Status of {}", path),
            &lines,
            "End of status",
        )
        .await
    }
}
