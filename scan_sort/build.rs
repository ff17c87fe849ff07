fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(feature = "cuda")]
    {
        println!("cargo:rerun-if-changed=../scan_sort_gpu/src");
        cuda_builder::CudaBuilder::new("../scan_sort_gpu")
            .copy_to("../resources/scan_sort_gpu.ptx")
            .build()
            .unwrap();
    }
}
