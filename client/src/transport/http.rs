use async_trait::async_trait;
use reqwest::{Client, Response};
use varredor_core::{BoardSnapshot, CellCount, Coord};

use super::{BoardTransport, GameId, TransportError, TransportResult};

/// REST client for the external minesweeper service.
///
/// The wire format is owned by the server: the creation endpoint answers
/// with a plain-text game id, everything else with a full board snapshot in
/// JSON.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/api/minesweeper{}", self.base_url, tail)
    }

    async fn check(response: Response) -> TransportResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Status { status, body })
        }
    }

    async fn snapshot(response: Response) -> TransportResult<BoardSnapshot> {
        let snapshot: BoardSnapshot = Self::check(response).await?.json().await?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[async_trait]
impl BoardTransport for HttpTransport {
    async fn create_game(
        &self,
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    ) -> TransportResult<GameId> {
        let response = self
            .client
            .post(self.endpoint("/new"))
            .query(&[
                ("rows", rows as CellCount),
                ("cols", cols as CellCount),
                ("mines", mines),
            ])
            .send()
            .await?;
        let id = Self::check(response).await?.text().await?;
        log::debug!("created game {id} ({rows}x{cols}, {mines} mines)");
        Ok(id)
    }

    async fn fetch_board(&self, id: &str) -> TransportResult<BoardSnapshot> {
        let response = self
            .client
            .get(self.endpoint(&format!("/{id}")))
            .send()
            .await?;
        Self::snapshot(response).await
    }

    async fn reveal(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot> {
        let response = self
            .client
            .post(self.endpoint(&format!("/{id}/reveal")))
            .query(&[("row", row), ("col", col)])
            .send()
            .await?;
        Self::snapshot(response).await
    }

    async fn flag(&self, id: &str, row: Coord, col: Coord) -> TransportResult<BoardSnapshot> {
        let response = self
            .client
            .post(self.endpoint(&format!("/{id}/flag")))
            .query(&[("row", row), ("col", col)])
            .send()
            .await?;
        Self::snapshot(response).await
    }
}
