//! Reftime inference from archive file names.

use std::path::Path;

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];

/// Infers the reftime from a file name such as `u60_cf_2017-01-02_sfc.nc`.
///
/// The file stem is split on `_`. The last two pieces are tried first, then
/// the remaining ones from the front, and the first piece that parses as
/// `YYYYMMDD` or `YYYY-MM-DD` wins.
pub fn infer_reftime_from_filename(path: impl AsRef<Path>) -> Option<NaiveDate> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let pieces: Vec<&str> = stem.split('_').collect();
    let split = pieces.len().saturating_sub(2);
    let (head, tail) = pieces.split_at(split);

    tail.iter().chain(head).find_map(|piece| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(piece, fmt).ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_second_to_last() {
        assert_eq!(
            infer_reftime_from_filename("/data/s2s/u60_2017-01-02_cf.nc"),
            Some(ymd(2017, 1, 2))
        );
    }

    #[test]
    fn compact_date_last() {
        assert_eq!(
            infer_reftime_from_filename("ecmwf_t2m_20200319.nc"),
            Some(ymd(2020, 3, 19))
        );
    }

    #[test]
    fn date_at_front() {
        assert_eq!(
            infer_reftime_from_filename("20161124_ecmwf_u_pf_hc.nc"),
            Some(ymd(2016, 11, 24))
        );
    }

    #[test]
    fn tail_preferred_over_head() {
        assert_eq!(
            infer_reftime_from_filename("20100101_x_20170105_cf.nc"),
            Some(ymd(2017, 1, 5))
        );
    }

    #[test]
    fn no_date() {
        assert_eq!(infer_reftime_from_filename("u60_cf.nc"), None);
        assert_eq!(infer_reftime_from_filename(""), None);
    }

    #[test]
    fn invalid_calendar_date() {
        assert_eq!(infer_reftime_from_filename("u_20170230_cf.nc"), None);
    }
}
