macro_rules! shaders {
    ([ $( $name:ident, )* ]) => {
        pub struct Shaders {
            $( pub $name: (wgpu::ShaderModule, &'static str), )*
        }

        impl Shaders {
            pub fn new(device: &wgpu::Device) -> Self {
                $(
                    let $name = {
                        let module = wgpu::ShaderModuleDescriptor {
                            label: Some(stringify!($name)),
                            source: wgpu::util::make_spirv(include_bytes!(
                                env!(concat!(
                                    "luster_shaders::",
                                    stringify!($name),
                                    ".path"
                                ))
                            )),
                        };

                        let module = device.create_shader_module(module);

                        let entry_point = env!(concat!(
                            "luster_shaders::",
                            stringify!($name),
                            ".entry_point"
                        ));

                        (module, entry_point)
                    };
                )*

                Self {
                    $( $name, )*
                }
            }
        }
    };
}

shaders! {
    [
        pathtrace,
        tonemap,
        upscale,
    ]
}
