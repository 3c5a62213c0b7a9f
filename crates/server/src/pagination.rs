use serde::Deserialize;

pub const MAX_PAGES: u64 = 10000;

/// Page number query parameter.
///
/// Pages are numbered from one, zero is treated as the first page as well.
#[derive(Deserialize)]
pub struct Pagination<const PER_PAGE: u64> {
    #[serde(default)]
    page: u64,
}

impl<const PER_PAGE: u64> Pagination<PER_PAGE> {
    pub fn page(&self) -> u64 {
        self.page.clamp(1, MAX_PAGES)
    }

    pub fn limit(&self) -> u64 {
        PER_PAGE
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1) * PER_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn offsets() {
        assert_eq!(Pagination::<25> { page: 0 }.offset(), 0);
        assert_eq!(Pagination::<25> { page: 1 }.offset(), 0);
        assert_eq!(Pagination::<25> { page: 3 }.offset(), 50);
        assert_eq!(Pagination::<20> { page: 2 }.offset(), 20);
        assert_eq!(Pagination::<20> { page: u64::MAX }.page(), 10000);
    }
}
