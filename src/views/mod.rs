mod ajustes;
mod caja;
mod daily;
mod historial;
mod home;
mod login;
mod operaciones;
mod shared;

use std::rc::Rc;

use yew::prelude::*;

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::controller::{self, Effect, Page};
use crate::session::SessionStore;
use crate::transport::FetchTransport;

use ajustes::AjustesPage;
use caja::CajaPage;
use daily::DailyPage;
use historial::HistorialPage;
use home::HomePage;
use login::LoginPage;
use operaciones::OperacionesPage;

/// Shared with every page through a yew context.
#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub api: ApiClient,
    pub navigate: Callback<Page>,
}

impl AppContext {
    pub fn apply(&self, effect: Effect, reload: &UseStateHandle<u32>) {
        match effect {
            Effect::Navigate(page) => self.navigate.emit(page),
            Effect::ReloadList => reload.set(reload.wrapping_add(1)),
        }
    }

    pub fn apply_navigation(&self, effect: Effect) {
        if let Effect::Navigate(page) = effect {
            self.navigate.emit(page);
        }
    }
}

fn build_client() -> ApiClient {
    let config = ApiConfig::resolve();
    log::info!("API base URL: {}", config.base_url());
    ApiClient::new(config, Rc::new(FetchTransport), SessionStore::browser())
}

#[function_component(App)]
pub fn app() -> Html {
    let api = use_state(build_client);
    let active_page = use_state(|| {
        if api.session().is_authenticated() {
            Page::Home
        } else {
            Page::Login
        }
    });

    let context = AppContext {
        api: (*api).clone(),
        navigate: {
            let active_page = active_page.clone();
            Callback::from(move |page: Page| active_page.set(page))
        },
    };

    let content = match *active_page {
        Page::Login => html! { <LoginPage /> },
        Page::Home => html! { <HomePage /> },
        Page::Operaciones => html! { <OperacionesPage /> },
        Page::CajaFuerte => html! { <CajaPage /> },
        Page::Daily => html! { <DailyPage /> },
        Page::Historial => html! { <HistorialPage /> },
        Page::Ajustes => html! { <AjustesPage /> },
    };

    html! {
        <ContextProvider<AppContext> context={context}>
            {
                if *active_page == Page::Login {
                    content
                } else {
                    html! { <Layout active_page={*active_page}>{ content }</Layout> }
                }
            }
        </ContextProvider<AppContext>>
    }
}

#[derive(Properties, PartialEq)]
struct LayoutProps {
    children: Children,
    active_page: Page,
}

#[function_component(Layout)]
fn layout(props: &LayoutProps) -> Html {
    let ctx = use_context::<AppContext>();
    let session = ctx.as_ref().and_then(|ctx| ctx.api.session().load());

    let on_logout = {
        let ctx = ctx.clone();
        Callback::from(move |_| {
            if let Some(ctx) = ctx.as_ref() {
                let effect = controller::logout(ctx.api.session());
                ctx.apply_navigation(effect);
            }
        })
    };

    html! {
        <div class="flex h-screen bg-background">
            <div class="hidden md:flex w-[220px] bg-[#0F2A3D] p-4 flex-col">
                <span class="text-white text-2xl font-black tracking-tight px-2 mb-8">{"EAXY"}</span>
                <nav class="flex-1 flex flex-col gap-1">
                    { for Page::NAV.iter().map(|page| {
                        let page = *page;
                        let active = page == props.active_page;
                        let onclick = {
                            let ctx = ctx.clone();
                            Callback::from(move |_| {
                                if let Some(ctx) = ctx.as_ref() {
                                    ctx.navigate.emit(page);
                                }
                            })
                        };
                        html! {
                            <button {onclick} class={if active {
                                "text-left px-4 py-2 rounded-lg text-sm font-semibold bg-white text-[#0F2A3D]"
                            } else {
                                "text-left px-4 py-2 rounded-lg text-sm font-semibold text-white/80 hover:bg-white/10"
                            }}>
                                { page.title() }
                            </button>
                        }
                    }) }
                </nav>
                <button onclick={on_logout} class="mt-4 px-4 py-2 rounded-lg text-sm text-white/80 hover:bg-white/10 text-left">
                    {"Cerrar sesión"}
                </button>
            </div>

            <div class="flex-1 flex flex-col overflow-hidden">
                <header class="bg-[#D8E1E8] border-b border-border h-16 flex items-center justify-between px-6">
                    <h2 class="font-bold text-[#0F2A3D]">{ props.active_page.title() }</h2>
                    {
                        match session {
                            Some(session) => html! {
                                <span class="text-sm text-slate-600">{ format!("{} · {}", session.username, session.branch) }</span>
                            },
                            None => html! {},
                        }
                    }
                </header>
                <main class="flex-1 overflow-y-auto">
                    { for props.children.iter() }
                </main>
            </div>
        </div>
    }
}
