#![feature(test)]
extern crate html2plain;
extern crate test;

use ::test::Bencher;

use html2plain::{from_read, from_read_with_options, Options};

fn make_html(content: &str) -> String {
    String::from("<html>") + content + "</html>"
}

fn make_tab(cell: &str, rows: usize, cols: usize) -> String {
    let mut result = String::from("<table>");
    for _ in 0..rows {
        result.push_str("<tr>");
        for _ in 0..cols {
            result.push_str("<td>");
            result.push_str(cell);
            result.push_str("</td>");
        }
        result.push_str("</tr>");
    }
    result
}

fn pretty() -> Options {
    Options {
        pretty_tables: true,
        ..Default::default()
    }
}

#[bench]
fn bench_empty(b: &mut Bencher) {
    b.iter(|| from_read(make_html("").as_bytes()));
}

#[bench]
fn bench_paragraphs(b: &mut Bencher) {
    let para = format!("<p>{}</p>", "lorem ipsum dolor sit amet ".repeat(40));
    let html = make_html(&para.repeat(20));
    b.iter(|| from_read(html.as_bytes()));
}

#[bench]
fn bench_flat_tab_6_6(b: &mut Bencher) {
    b.iter(|| from_read(make_html(&make_tab("cell", 6, 6)).as_bytes()));
}

#[bench]
fn bench_tab_1_1(b: &mut Bencher) {
    let opts = pretty();
    b.iter(|| from_read_with_options(make_html(&make_tab("cell", 1, 1)).as_bytes(), &opts));
}
#[bench]
fn bench_tab_2_2(b: &mut Bencher) {
    let opts = pretty();
    b.iter(|| from_read_with_options(make_html(&make_tab("cell", 2, 2)).as_bytes(), &opts));
}
#[bench]
fn bench_tab_4_4(b: &mut Bencher) {
    let opts = pretty();
    b.iter(|| from_read_with_options(make_html(&make_tab("cell", 4, 4)).as_bytes(), &opts));
}
#[bench]
fn bench_tab_6_6(b: &mut Bencher) {
    let opts = pretty();
    b.iter(|| from_read_with_options(make_html(&make_tab("cell", 6, 6)).as_bytes(), &opts));
}
#[bench]
fn bench_tab_long_cells(b: &mut Bencher) {
    let opts = pretty();
    let cell = "a few words which need wrapping ".repeat(8);
    let html = make_html(&make_tab(&cell, 4, 3));
    b.iter(|| from_read_with_options(html.as_bytes(), &opts));
}
// Try a table with `depth` nested tables each with `rows` rows and `cols` columns.
fn bench_tab_depth(b: &mut Bencher, content: &str, depth: usize, rows: usize, cols: usize) {
    let mut t = String::from(content);
    for _ in 0..depth {
        t = make_tab(&t, rows, cols);
    }
    let html = make_html(&t);
    let opts = pretty();
    b.iter(|| from_read_with_options(html.as_bytes(), &opts));
}
#[bench]
fn bench_tab_2_1_depth_2(b: &mut Bencher) {
    bench_tab_depth(b, "cell", 2, 2, 1);
}
#[bench]
fn bench_tab_1_2_depth_2(b: &mut Bencher) {
    bench_tab_depth(b, "cell", 2, 1, 2);
}
#[bench]
fn bench_tab_2_depth_3(b: &mut Bencher) {
    bench_tab_depth(b, "cell", 3, 2, 2);
}
