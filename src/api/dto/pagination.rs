//! Pagination and listing query parameters.

use serde::Deserialize;

/// Query parameters for `GET /api/links`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub order_by: Option<String>,
}

impl ListParams {
    /// Validates pagination parameters.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 25
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Page size must be between 1 and 100
    pub fn validate(&self) -> Result<(i64, i64), String> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(25);

        if page < 1 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=100).contains(&page_size) {
            return Err("Page size must be between 1 and 100".to_string());
        }

        Ok((page, page_size))
    }
}

/// Query parameter for `GET /api/links/popular` and `/recent`.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    pub fn limit_or(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, page_size: Option<i64>) -> ListParams {
        ListParams {
            page,
            page_size,
            search: None,
            order_by: None,
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(params(None, None).validate().unwrap(), (1, 25));
    }

    #[test]
    fn test_explicit_values() {
        assert_eq!(params(Some(3), Some(50)).validate().unwrap(), (3, 50));
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).validate().is_err());
        assert!(params(None, Some(101)).validate().is_err());
        assert!(params(None, Some(100)).validate().is_ok());
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(LimitParams { limit: None }.limit_or(10, 100), 10);
        assert_eq!(LimitParams { limit: Some(500) }.limit_or(10, 100), 100);
        assert_eq!(LimitParams { limit: Some(-1) }.limit_or(10, 100), 1);
    }
}
