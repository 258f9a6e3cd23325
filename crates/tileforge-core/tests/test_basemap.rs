mod common;

use approx::assert_relative_eq;
use tempfile::tempdir;

use common::test_basemap;
use tileforge_core::basemap::proj_coord_to_pixel_coord;
use tileforge_core::geometry::Rect;

#[test]
fn degree_to_pixel_uses_north_up_origin() {
    let dir = tempdir().unwrap();
    let basemap = test_basemap(dir.path());

    // 20 px/deg at low resolution; (-180, +90) is pixel (0, 0).
    let roi = Rect::new(-180.0, -179.0, 89.0, 90.0);
    let pixels = basemap.degree_roi_to_pixel_roi(&roi, false);
    assert_relative_eq!(pixels.min_x, 0.0);
    assert_relative_eq!(pixels.max_x, 20.0);
    assert_relative_eq!(pixels.min_y, 0.0);
    assert_relative_eq!(pixels.max_y, 20.0);
}

#[test]
fn degree_pixel_round_trip() {
    let dir = tempdir().unwrap();
    let basemap = test_basemap(dir.path());
    let roi = Rect::new(9.0, 11.5, 19.0, 21.4);

    for high_res in [false, true] {
        let pixels = basemap.degree_roi_to_pixel_roi(&roi, high_res);
        let back = basemap.pixel_roi_to_degree_roi(&pixels, high_res);
        assert_relative_eq!(back.min_x, roi.min_x, epsilon = 1e-9);
        assert_relative_eq!(back.max_x, roi.max_x, epsilon = 1e-9);
        assert_relative_eq!(back.min_y, roi.min_y, epsilon = 1e-9);
        assert_relative_eq!(back.max_y, roi.max_y, epsilon = 1e-9);
    }
}

#[test]
fn resolution_conversion_scales_by_mpp_ratio() {
    let dir = tempdir().unwrap();
    let basemap = test_basemap(dir.path());

    let low = Rect::new(100.0, 200.0, 50.0, 80.0);
    let high = basemap.convert_pixel_roi_resolution(&low, true);
    assert_relative_eq!(high.min_x, 1000.0);
    assert_relative_eq!(high.max_x, 2000.0);

    let back = basemap.convert_pixel_roi_resolution(&high, false);
    assert_relative_eq!(back.min_x, low.min_x);
    assert_relative_eq!(back.max_y, low.max_y);
}

#[test]
fn proj_coord_maps_into_crop_pixels() {
    let dir = tempdir().unwrap();
    let basemap = test_basemap(dir.path());

    // 1000 projected units per degree for this basemap.
    assert_relative_eq!(basemap.meters_per_degree(), 1000.0);

    let crop = Rect::new(10.0, 12.0, 20.0, 22.0);
    let geo = basemap.crop_geo_info(&crop);

    // The crop's own north-west corner is pixel (0, 0).
    let (col, row) = proj_coord_to_pixel_coord(10_000.0, 22_000.0, &geo);
    assert_relative_eq!(col, 0.0);
    assert_relative_eq!(row, 0.0);

    // One degree east and south of the corner: 20 low-res pixels.
    let (col, row) = proj_coord_to_pixel_coord(11_000.0, 21_000.0, &geo);
    assert_relative_eq!(col, 20.0);
    assert_relative_eq!(row, 20.0);
}

#[test]
fn crop_geo_info_sizes_match_pixel_roi() {
    let dir = tempdir().unwrap();
    let basemap = test_basemap(dir.path());

    let crop = Rect::new(9.0, 11.5, 19.0, 21.4);
    let geo = basemap.crop_geo_info(&crop);
    assert_eq!(geo.image_size, (50, 48));
    assert_relative_eq!(geo.pixel_size.0, 50.0);
    assert_relative_eq!(geo.pixel_size.1, -50.0);
}
