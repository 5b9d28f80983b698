use reqwest::{Client, RequestBuilder, Response, Url};

use super::auth::{AccessTokenProvider, ServiceAccountAuth, SPREADSHEETS_SCOPE};
use super::failure_parts;
use crate::core::sheets::{
    build_range, BatchGetResponse, MajorDimension, RangeTarget, SheetsError,
    UpdateValuesResponse, ValueBlock, ValueRange,
};

const API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Columns read when fetching a whole sheet.
const WHOLE_SHEET_COLUMNS: &str = "A:ZZ";

/// Sheets v4 REST client for reading and writing cell values.
pub struct GoogleSheetsClient {
    client: Client,
    auth: Box<dyn AccessTokenProvider>,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(auth: Box<dyn AccessTokenProvider>) -> Self {
        Self::with_base_url(auth, API_BASE)
    }

    pub fn with_base_url(auth: Box<dyn AccessTokenProvider>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: base_url.into(),
        }
    }

    pub async fn from_env() -> Result<Self, SheetsError> {
        let auth = ServiceAccountAuth::from_env(&[SPREADSHEETS_SCOPE])
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;
        Ok(Self::new(Box::new(auth)))
    }

    /// Fetches one or more ranges in a single call.
    pub async fn get_values(
        &self,
        sheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
    ) -> Result<BatchGetResponse, SheetsError> {
        let url = self.values_url(sheet_id, None, "values:batchGet")?;

        let mut query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", *r)).collect();
        query.push(("majorDimension", major_dimension.as_str()));

        let response = self.send(self.client.get(url).query(&query)).await?;
        response
            .json()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))
    }

    /// Returns every populated row of `sheet_name`, or an empty block when the
    /// sheet has no values.
    pub async fn get_sheet_values(
        &self,
        sheet_id: &str,
        sheet_name: &str,
    ) -> Result<ValueBlock, SheetsError> {
        let range = format!("{}!{}", sheet_name, WHOLE_SHEET_COLUMNS);
        let response = self
            .get_values(sheet_id, &[&range], MajorDimension::Rows)
            .await?;
        Ok(response
            .value_ranges
            .into_iter()
            .next()
            .map(|r| r.values)
            .unwrap_or_default())
    }

    /// Writes `values` with `USER_ENTERED` semantics, so strings like `=SUM(A1:A3)`
    /// or `2024/01/01` are parsed the way the UI would parse them.
    pub async fn post_values(
        &self,
        sheet_id: &str,
        values: ValueBlock,
        target: &RangeTarget,
        major_dimension: MajorDimension,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let range = resolve_range(target, &values)?;
        let url = self.values_url(sheet_id, Some(&range), "")?;

        let body = ValueRange {
            range: range.clone(),
            major_dimension,
            values,
        };

        tracing::debug!("Updating {} in spreadsheet {}", range, sheet_id);

        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);
        let updated: UpdateValuesResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        tracing::info!(
            "Updated {} cell(s) in {}",
            updated.updated_cells.unwrap_or_default(),
            updated.updated_range.as_deref().unwrap_or(&range)
        );
        Ok(updated)
    }

    /// `{base}/spreadsheets/{id}/values[/{range}]`, with a trailing literal
    /// segment such as `values:batchGet` when `range` is absent.
    fn values_url(
        &self,
        sheet_id: &str,
        range: Option<&str>,
        action: &str,
    ) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| SheetsError::Url(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Url(self.base_url.clone()))?;
            segments.pop_if_empty().push("spreadsheets").push(sheet_id);
            match range {
                Some(range) => {
                    segments.push("values").push(range);
                }
                None => {
                    segments.push(action);
                }
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SheetsError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetsError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(SheetsError::Api { status, body });
        }
        Ok(response)
    }
}

/// Turns a write target into the range string sent to the API.
pub fn resolve_range(target: &RangeTarget, values: &ValueBlock) -> Result<String, SheetsError> {
    match target {
        RangeTarget::Explicit(range) => Ok(range.clone()),
        RangeTarget::Anchor {
            sheet_name,
            start_row,
            start_col,
        } => Ok(build_range(sheet_name, values, *start_row, *start_col)?.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sheets::RangeError;
    use crate::infra::google::StaticToken;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GoogleSheetsClient {
        GoogleSheetsClient::with_base_url(
            Box::new(StaticToken("sheet-token".to_string())),
            server.base_url(),
        )
    }

    fn sample_block() -> ValueBlock {
        vec![
            vec![json!("a"), json!("b")],
            vec![json!("c"), json!("d")],
            vec![json!("e"), json!("f")],
        ]
    }

    #[test]
    fn test_resolve_anchor() {
        let target = RangeTarget::Anchor {
            sheet_name: "Sheet1".to_string(),
            start_row: 1,
            start_col: 1,
        };
        assert_eq!(
            resolve_range(&target, &sample_block()).unwrap(),
            "Sheet1!R1C1:R3C2"
        );
    }

    #[test]
    fn test_resolve_explicit_ignores_shape() {
        let target = RangeTarget::Explicit("Sheet1!A1:Z9".to_string());
        assert_eq!(resolve_range(&target, &Vec::new()).unwrap(), "Sheet1!A1:Z9");
    }

    #[test]
    fn test_resolve_anchor_rejects_ragged_block() {
        let target = RangeTarget::Anchor {
            sheet_name: "Sheet1".to_string(),
            start_row: 1,
            start_col: 1,
        };
        let ragged = vec![vec![json!("a"), json!("b")], vec![json!("c")]];
        let err = resolve_range(&target, &ragged).unwrap_err();
        assert!(matches!(err, SheetsError::Range(RangeError::InvalidShape(_))));
    }

    #[tokio::test]
    async fn test_get_sheet_values() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/spreadsheets/sheet-1/values:batchGet")
                    .query_param("ranges", "Sheet1!A:ZZ")
                    .query_param("majorDimension", "ROWS")
                    .header("authorization", "Bearer sheet-token");
                then.status(200).json_body(json!({
                    "spreadsheetId": "sheet-1",
                    "valueRanges": [{
                        "range": "Sheet1!A1:B2",
                        "majorDimension": "ROWS",
                        "values": [["a1", "b1"], ["a2", "b2"]]
                    }]
                }));
            })
            .await;

        let values = client_for(&server)
            .get_sheet_values("sheet-1", "Sheet1")
            .await
            .unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values[1][0], json!("a2"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_sheet_values_empty_sheet() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/spreadsheets/sheet-1/values:batchGet");
                then.status(200).json_body(json!({
                    "spreadsheetId": "sheet-1",
                    "valueRanges": [{ "range": "Sheet1!A1:ZZ1000", "majorDimension": "ROWS" }]
                }));
            })
            .await;

        let values = client_for(&server)
            .get_sheet_values("sheet-1", "Sheet1")
            .await
            .unwrap();

        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_post_values_to_anchor() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/spreadsheets/sheet-1/values/Sheet1!R2C3:R4C4")
                    .query_param("valueInputOption", "USER_ENTERED")
                    .json_body(json!({
                        "range": "Sheet1!R2C3:R4C4",
                        "majorDimension": "ROWS",
                        "values": [["a", "b"], ["c", "d"], ["e", "f"]]
                    }));
                then.status(200).json_body(json!({
                    "spreadsheetId": "sheet-1",
                    "updatedRange": "Sheet1!C2:D4",
                    "updatedRows": 3,
                    "updatedColumns": 2,
                    "updatedCells": 6
                }));
            })
            .await;

        let target = RangeTarget::Anchor {
            sheet_name: "Sheet1".to_string(),
            start_row: 2,
            start_col: 3,
        };
        let updated = client_for(&server)
            .post_values("sheet-1", sample_block(), &target, MajorDimension::Rows)
            .await
            .unwrap();

        assert_eq!(updated.updated_cells, Some(6));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_values_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT);
                then.status(403).body("PERMISSION_DENIED");
            })
            .await;

        let target = RangeTarget::Explicit("Sheet1!A1:B3".to_string());
        let err = client_for(&server)
            .post_values("sheet-1", sample_block(), &target, MajorDimension::Rows)
            .await
            .unwrap_err();

        assert!(matches!(err, SheetsError::Api { status: 403, .. }));
    }
}
